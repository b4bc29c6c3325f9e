//! Digital identity score: social reach combined with website rank.
//!
//! Scores are relative to the population they are computed against. Scoring
//! the same organisation within a different batch gives a different number, so
//! values from separate runs are not comparable.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Weight of the follower term relative to the website rank term.
pub const DEFAULT_FREQUENCY_RATIO: f64 = 0.1345;

/// Population means the score is relative to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub mean_followers: f64,
    pub mean_ws_rank: f64,
}

/// `followers * ratio / mean_followers + ws_rank / mean_ws_rank`.
///
/// A term whose population mean is zero (or not finite) contributes 0.0.
pub fn digital_score(
    followers: f64,
    ws_rank: f64,
    population: PopulationStats,
    frequency_ratio: f64,
) -> f64 {
    relative(followers * frequency_ratio, population.mean_followers)
        + relative(ws_rank, population.mean_ws_rank)
}

fn relative(value: f64, mean: f64) -> f64 {
    if mean == 0.0 || !mean.is_finite() {
        0.0
    } else {
        value / mean
    }
}

/// Reads the follower count from a profile headline such as
/// `"Acme Ltd | 12,345 followers"`: the second-to-last word, commas removed.
pub fn parse_follower_count(headline: &str) -> Option<u64> {
    let words: Vec<&str> = headline.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    words[words.len() - 2].replace(',', "").parse().ok()
}

/// One organisation's entry in a `linkedin_stats_*.json` file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FollowerStats {
    pub org_id: i64,
    pub followers: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DigitalIdentityInput {
    pub org_id: i64,
    pub followers: u64,
    /// Latest website rank, if one has been computed.
    pub ws_rank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitalScore {
    pub org_id: i64,
    pub score: f64,
}

/// Scores a batch against its own population means.
///
/// The follower mean covers every member; the rank mean covers members with a
/// rank. Members without a rank get no score.
#[derive(Debug, Clone)]
pub struct DigitalIdentityBatch {
    members: Vec<DigitalIdentityInput>,
    frequency_ratio: f64,
}

impl DigitalIdentityBatch {
    pub fn new(members: Vec<DigitalIdentityInput>) -> Self {
        Self {
            members,
            frequency_ratio: DEFAULT_FREQUENCY_RATIO,
        }
    }

    pub fn with_frequency_ratio(mut self, frequency_ratio: f64) -> Self {
        self.frequency_ratio = frequency_ratio;
        self
    }

    pub fn population(&self) -> PopulationStats {
        let followers: Vec<f64> = self.members.iter().map(|m| m.followers as f64).collect();
        let ranks: Vec<f64> = self.members.iter().filter_map(|m| m.ws_rank).collect();
        PopulationStats {
            mean_followers: mean(&followers),
            mean_ws_rank: mean(&ranks),
        }
    }

    pub fn score(&self) -> Vec<DigitalScore> {
        let population = self.population();
        self.members
            .iter()
            .filter_map(|member| {
                let Some(ws_rank) = member.ws_rank else {
                    warn!(
                        "Organisation {} has no website rank; unable to compute its digital score",
                        member.org_id
                    );
                    return None;
                };
                Some(DigitalScore {
                    org_id: member.org_id,
                    score: digital_score(
                        member.followers as f64,
                        ws_rank,
                        population,
                        self.frequency_ratio,
                    ),
                })
            })
            .collect()
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(mean_followers: f64, mean_ws_rank: f64) -> PopulationStats {
        PopulationStats {
            mean_followers,
            mean_ws_rank,
        }
    }

    #[test]
    fn test_linear_in_followers() {
        let pop = population(1_000.0, 0.5);
        let one = digital_score(1_000.0, 0.0, pop, DEFAULT_FREQUENCY_RATIO);
        let two = digital_score(2_000.0, 0.0, pop, DEFAULT_FREQUENCY_RATIO);
        assert!((two - 2.0 * one).abs() < 1e-12);
        assert!((one - DEFAULT_FREQUENCY_RATIO).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_in_mean_followers() {
        let small = digital_score(500.0, 0.0, population(1_000.0, 0.5), 0.1345);
        let large = digital_score(500.0, 0.0, population(2_000.0, 0.5), 0.1345);
        assert!((small - 2.0 * large).abs() < 1e-12);
    }

    #[test]
    fn test_average_member_scores_ratio_plus_one() {
        let score = digital_score(1_000.0, 0.6, population(1_000.0, 0.6), 0.1345);
        assert!((score - 1.1345).abs() < 1e-12);
    }

    #[test]
    fn test_zero_means_contribute_nothing() {
        assert_eq!(digital_score(10.0, 0.5, population(0.0, 0.0), 0.1345), 0.0);
        assert_eq!(digital_score(10.0, 0.5, population(0.0, 0.5), 0.1345), 1.0);
    }

    #[test]
    fn test_parse_follower_count() {
        assert_eq!(parse_follower_count("Acme Ltd | 12,345 followers"), Some(12_345));
        assert_eq!(parse_follower_count("  987 followers "), Some(987));
        assert_eq!(parse_follower_count("followers"), None);
        assert_eq!(parse_follower_count("Acme | many followers"), None);
        assert_eq!(parse_follower_count(""), None);
    }

    #[test]
    fn test_batch_skips_members_without_rank() {
        let batch = DigitalIdentityBatch::new(vec![
            DigitalIdentityInput {
                org_id: 1,
                followers: 100,
                ws_rank: Some(0.4),
            },
            DigitalIdentityInput {
                org_id: 2,
                followers: 300,
                ws_rank: None,
            },
            DigitalIdentityInput {
                org_id: 3,
                followers: 200,
                ws_rank: Some(0.8),
            },
        ]);

        let pop = batch.population();
        assert_eq!(pop.mean_followers, 200.0);
        assert!((pop.mean_ws_rank - 0.6).abs() < 1e-12);

        let scores = batch.score();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].org_id, 1);
        assert_eq!(scores[1].org_id, 3);
        assert!((scores[1].score - (200.0 * 0.1345 / 200.0 + 0.8 / 0.6)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_batch() {
        assert!(DigitalIdentityBatch::new(Vec::new()).score().is_empty());
    }
}
