use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use esg_signals::scoring::{
    DigitalIdentityBatch, DigitalIdentityInput, ScoreRecord, ScoreType, SeoReport,
    digital::FollowerStats,
};
use serde::de::DeserializeOwned;
use tracing::info;

const USAGE: &str = "usage: score <seo_stats.json> [linkedin_stats.json]";

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 2 {
        bail!(USAGE);
    }

    let now = Utc::now();
    let reports: Vec<SeoReport> = load(Path::new(&args[0]))?;
    let mut records = Vec::new();
    let mut ranks = HashMap::new();

    for report in &reports {
        let rank = report.rank();
        ranks.insert(report.org_id, rank);
        records.push(ScoreRecord::new(report.org_id, ScoreType::WsRank, now, rank));
    }
    info!("Computed {} website ranks", reports.len());

    if let Some(path) = args.get(1) {
        let followers: Vec<FollowerStats> = load(Path::new(path))?;
        let batch = DigitalIdentityBatch::new(
            followers
                .into_iter()
                .map(|f| DigitalIdentityInput {
                    org_id: f.org_id,
                    followers: f.followers,
                    ws_rank: ranks.get(&f.org_id).copied(),
                })
                .collect(),
        );
        let scores = batch.score();
        info!("Computed {} digital scores (relative to this batch)", scores.len());
        records.extend(
            scores
                .into_iter()
                .map(|s| ScoreRecord::new(s.org_id, ScoreType::DigitalScore, now, s.score)),
        );
    }

    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}
