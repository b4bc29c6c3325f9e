use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use esg_signals::{
    config::Config,
    content::ArticleContentFetcher,
    gdelt::GdeltClient,
    ingest::{BatchIngestor, DateWindow, TargetEntity},
};
use tracing::info;

const USAGE: &str = "usage: ingest <entities.json> [start YYYYMMDD[HHMMSS]] [end YYYYMMDD[HHMMSS]]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 3 {
        bail!(USAGE);
    }

    let today = Utc::now().date_naive();
    let start = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| (today - Duration::days(1)).format("%Y%m%d").to_string());
    let end = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| today.format("%Y%m%d").to_string());

    let raw = std::fs::read_to_string(&args[0])
        .with_context(|| format!("failed to read entity list {}", args[0]))?;
    let entities: Vec<TargetEntity> =
        serde_json::from_str(&raw).with_context(|| format!("invalid entity list {}", args[0]))?;

    let config = Config::from_env()?;
    let client = GdeltClient::new(&config.client_settings())?;
    let ingestor = BatchIngestor::new(client, ArticleContentFetcher::new(), config.ingest_settings());

    let report = ingestor.run(&entities, &DateWindow::new(start, end)).await?;
    if let Some(abort) = &report.abort {
        info!("Run stopped early: {}", abort);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
