//! Turns downloaded news articles into per-document ESG insights.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::classify::{ClassificationResult, TextClassifier, top_label};
use crate::gdelt::ArticleRecord;
use crate::scoring::esg::{BroadCategory, EsgTopic};
use crate::scoring::sentiment::{Sentiment, collapse_detailed, rescale};

/// One non-empty line of an article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPart {
    pub index: usize,
    pub content: String,
    /// `None` when the top topic label is not one the scorer knows.
    pub topic: Option<EsgTopic>,
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInsight {
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub source_country: String,
    pub category: BroadCategory,
    /// Mean part sentiment, in `[-1, 1]`.
    pub sentiment: f64,
    pub parts: Vec<DocumentPart>,
}

/// Runs the broad, topic and sentiment classifiers over article bodies.
pub struct DocumentAnalyzer<'a> {
    broad: &'a dyn TextClassifier,
    topic: &'a dyn TextClassifier,
    sentiment: &'a dyn TextClassifier,
}

impl<'a> DocumentAnalyzer<'a> {
    pub fn new(
        broad: &'a dyn TextClassifier,
        topic: &'a dyn TextClassifier,
        sentiment: &'a dyn TextClassifier,
    ) -> Self {
        Self {
            broad,
            topic,
            sentiment,
        }
    }

    /// Returns `None` for articles without a body and for articles the broad
    /// classifier does not consider ESG related.
    #[instrument(skip(self, article), fields(url = %article.url))]
    pub async fn analyze(&self, article: &ArticleRecord) -> anyhow::Result<Option<DocumentInsight>> {
        let content = article.content.trim();
        if content.is_empty() {
            info!("No content found for article");
            return Ok(None);
        }

        let broad = self.broad.classify(&[content.to_string()]).await?;
        let category = broad
            .first()
            .and_then(|dist| top_label(dist))
            .and_then(|top| BroadCategory::from_label(&top.label))
            .unwrap_or(BroadCategory::None);
        if category == BroadCategory::None {
            info!("Content is not ESG related");
            return Ok(None);
        }

        let parts: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        let topics = self.topic.classify(&parts).await?;
        let sentiments = self.sentiment.classify(&parts).await?;
        if topics.len() != parts.len() || sentiments.len() != parts.len() {
            anyhow::bail!(
                "classifier returned {} topic and {} sentiment results for {} parts",
                topics.len(),
                sentiments.len(),
                parts.len()
            );
        }

        let parts: Vec<DocumentPart> = parts
            .into_iter()
            .zip(topics.iter().zip(&sentiments))
            .enumerate()
            .map(|(index, (content, (topic, sentiment)))| DocumentPart {
                index,
                content,
                topic: top_label(topic).and_then(|t| EsgTopic::from_label(&t.label)),
                sentiment: part_sentiment(sentiment),
            })
            .collect();

        let sentiment = if parts.is_empty() {
            0.0
        } else {
            parts.iter().map(|p| p.sentiment).sum::<f64>() / parts.len() as f64
        };
        debug!(?category, sentiment, parts = parts.len(), "Analysed article");

        Ok(Some(DocumentInsight {
            url: article.url.clone(),
            published_at: article.published_at,
            source_country: article.source_country.clone(),
            category,
            sentiment,
            parts,
        }))
    }
}

/// Detailed (per-pillar) sentiment labels are collapsed before rescaling.
fn part_sentiment(distribution: &[ClassificationResult]) -> f64 {
    let three_class = distribution
        .iter()
        .all(|r| Sentiment::from_label(&r.label).is_some());
    if three_class {
        rescale(distribution)
    } else {
        rescale(&collapse_detailed(distribution))
    }
}
