//! Seam to the text classification models.
//!
//! Model loading and inference live outside this crate. Callers construct a
//! classifier once and hand out `&dyn TextClassifier` references.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    #[serde(alias = "prob")]
    pub probability: f64,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Classifies each input text independently. The outer vector is aligned with
/// `texts`; each inner vector is one probability distribution over the model's
/// labels.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<ClassificationResult>>>;
}

/// Highest-probability entry; the first one wins on ties.
pub fn top_label(distribution: &[ClassificationResult]) -> Option<&ClassificationResult> {
    distribution.iter().fold(None, |best, candidate| match best {
        Some(b) if b.probability >= candidate.probability => Some(b),
        _ => Some(candidate),
    })
}

/// Sorts a distribution descending by probability, keeping input order on ties.
pub fn sort_descending(distribution: &mut [ClassificationResult]) {
    distribution.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}
