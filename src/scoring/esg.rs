//! Batch-relative ESG scoring of sustainability reports.
//!
//! Every page of a report is classified twice: once into a broad pillar
//! (Environmental, Social, Governance or None) and once into a fine topic.
//! Per-document mean confidences are turned into percentile ranks against the
//! other documents in the same batch, so a document's score depends on the
//! batch it was scored with.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::classify::{ClassificationResult, TextClassifier, top_label};
use crate::scoring::digital::mean;
use crate::scoring::percentile::percentile_ranks;
use crate::scoring::record::{ScoreRecord, ScoreType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BroadCategory {
    Environmental,
    Social,
    Governance,
    None,
}

impl BroadCategory {
    pub const PILLARS: [BroadCategory; 3] = [Self::Environmental, Self::Social, Self::Governance];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Environmental" => Some(Self::Environmental),
            "Social" => Some(Self::Social),
            "Governance" => Some(Self::Governance),
            "None" => Some(Self::None),
            _ => None,
        }
    }

    fn pillar_index(&self) -> Option<usize> {
        match self {
            Self::Environmental => Some(0),
            Self::Social => Some(1),
            Self::Governance => Some(2),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EsgTopic {
    ClimateChange,
    NaturalCapital,
    PollutionWaste,
    HumanCapital,
    ProductLiability,
    CommunityRelations,
    CorporateGovernance,
    BusinessEthics,
    NonEsg,
}

impl EsgTopic {
    /// The eight scored topics, grouped by pillar (3 E, 3 S, 2 G).
    pub const SCORED: [EsgTopic; 8] = [
        Self::ClimateChange,
        Self::NaturalCapital,
        Self::PollutionWaste,
        Self::HumanCapital,
        Self::ProductLiability,
        Self::CommunityRelations,
        Self::CorporateGovernance,
        Self::BusinessEthics,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Climate Change" => Some(Self::ClimateChange),
            "Natural Capital" => Some(Self::NaturalCapital),
            "Pollution & Waste" => Some(Self::PollutionWaste),
            "Human Capital" => Some(Self::HumanCapital),
            "Product Liability" => Some(Self::ProductLiability),
            "Community Relations" => Some(Self::CommunityRelations),
            "Corporate Governance" => Some(Self::CorporateGovernance),
            "Business Ethics & Values" => Some(Self::BusinessEthics),
            "Non-ESG" => Some(Self::NonEsg),
            _ => None,
        }
    }

    pub fn pillar(&self) -> BroadCategory {
        match self {
            Self::ClimateChange | Self::NaturalCapital | Self::PollutionWaste => {
                BroadCategory::Environmental
            }
            Self::HumanCapital | Self::ProductLiability | Self::CommunityRelations => {
                BroadCategory::Social
            }
            Self::CorporateGovernance | Self::BusinessEthics => BroadCategory::Governance,
            Self::NonEsg => BroadCategory::None,
        }
    }

    pub fn score_type(&self) -> Option<ScoreType> {
        match self {
            Self::ClimateChange => Some(ScoreType::ClimateChange),
            Self::NaturalCapital => Some(ScoreType::NaturalCapital),
            Self::PollutionWaste => Some(ScoreType::PollutionWaste),
            Self::HumanCapital => Some(ScoreType::HumanCapital),
            Self::ProductLiability => Some(ScoreType::ProductLiability),
            Self::CommunityRelations => Some(ScoreType::CommunityRelations),
            Self::CorporateGovernance => Some(ScoreType::CorporateGovernance),
            Self::BusinessEthics => Some(ScoreType::BusinessEthics),
            Self::NonEsg => None,
        }
    }

    fn scored_index(&self) -> Option<usize> {
        Self::SCORED.iter().position(|t| t == self)
    }
}

/// Both classifier outputs for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageClassification {
    pub broad: Vec<ClassificationResult>,
    pub topic: Vec<ClassificationResult>,
}

/// All classified pages of one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportClassifications {
    pub document: String,
    pub pages: Vec<PageClassification>,
}

/// Mean top-label confidence per pillar and per scored topic; 0.0 where no
/// page carries that label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentMeans {
    /// Environmental, Social, Governance.
    pub pillars: [f64; 3],
    /// In `EsgTopic::SCORED` order.
    pub topics: [f64; 8],
}

impl DocumentMeans {
    pub fn from_pages(pages: &[PageClassification]) -> Self {
        let mut pillar_probs: [Vec<f64>; 3] = Default::default();
        let mut topic_probs: [Vec<f64>; 8] = Default::default();

        for page in pages {
            if let Some(top) = top_label(&page.broad)
                && let Some(idx) = BroadCategory::from_label(&top.label).and_then(|c| c.pillar_index())
            {
                pillar_probs[idx].push(top.probability);
            }
            if let Some(top) = top_label(&page.topic)
                && let Some(idx) = EsgTopic::from_label(&top.label).and_then(|t| t.scored_index())
            {
                topic_probs[idx].push(top.probability);
            }
        }

        Self {
            pillars: pillar_probs.map(|probs| mean(&probs)),
            topics: topic_probs.map(|probs| mean(&probs)),
        }
    }
}

/// Pillar weights for the combined ESG value. Not renormalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EsgWeights {
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
}

impl Default for EsgWeights {
    fn default() -> Self {
        Self {
            environmental: 0.45,
            social: 0.45,
            governance: 0.25,
        }
    }
}

impl EsgWeights {
    pub fn sum(&self) -> f64 {
        self.environmental + self.social + self.governance
    }

    fn combine(&self, environmental: f64, social: f64, governance: f64) -> f64 {
        self.environmental * environmental + self.social * social + self.governance * governance
    }
}

/// One pillar-level estimate for a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EsgEstimate {
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
    pub esg: f64,
}

impl EsgEstimate {
    fn max(self, other: Self) -> Self {
        Self {
            environmental: self.environmental.max(other.environmental),
            social: self.social.max(other.social),
            governance: self.governance.max(other.governance),
            esg: self.esg.max(other.esg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsgScores {
    pub document: String,
    /// Topic percentiles in `EsgTopic::SCORED` order.
    pub topics: [f64; 8],
    /// Estimate from the broad pillar percentiles.
    pub broad_estimate: EsgEstimate,
    /// Estimate from the averaged topic percentiles.
    pub topic_estimate: EsgEstimate,
    /// Elementwise maximum of the two estimates.
    pub published: EsgEstimate,
}

impl EsgScores {
    pub fn topic(&self, topic: EsgTopic) -> Option<f64> {
        topic.scored_index().map(|idx| self.topics[idx])
    }

    /// Eight topic records followed by the four published pillar records.
    pub fn to_score_records(&self, entity_id: i64, at: DateTime<Utc>) -> Vec<ScoreRecord> {
        let topics = EsgTopic::SCORED
            .iter()
            .zip(self.topics)
            .filter_map(|(topic, value)| topic.score_type().map(|t| (t, value)));
        let pillars = [
            (ScoreType::Environmental, self.published.environmental),
            (ScoreType::Social, self.published.social),
            (ScoreType::Governance, self.published.governance),
            (ScoreType::Esg, self.published.esg),
        ];
        topics
            .chain(pillars)
            .map(|(score_type, value)| ScoreRecord::new(entity_id, score_type, at, value))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EsgPercentileScorer {
    weights: EsgWeights,
}

impl EsgPercentileScorer {
    pub fn new(weights: EsgWeights) -> Self {
        let sum = weights.sum();
        if (sum - 1.0).abs() > 1e-9 {
            warn!(
                "ESG weights sum to {:.4}, not 1; combined ESG values are scaled by the same factor",
                sum
            );
        }
        Self { weights }
    }

    pub fn weights(&self) -> EsgWeights {
        self.weights
    }

    /// Scores every report against the rest of the batch, in input order.
    pub fn score(&self, reports: &[ReportClassifications]) -> Vec<EsgScores> {
        let means: Vec<DocumentMeans> = reports
            .iter()
            .map(|r| DocumentMeans::from_pages(&r.pages))
            .collect();
        let names: Vec<String> = reports.iter().map(|r| r.document.clone()).collect();
        self.score_means(&names, &means)
    }

    /// `documents` and `means` are index-aligned.
    pub fn score_means(&self, documents: &[String], means: &[DocumentMeans]) -> Vec<EsgScores> {
        let pillar_ranks: Vec<Vec<f64>> = (0..3)
            .map(|idx| percentile_ranks(&column(means, |m| m.pillars[idx])))
            .collect();
        let topic_ranks: Vec<Vec<f64>> = (0..8)
            .map(|idx| percentile_ranks(&column(means, |m| m.topics[idx])))
            .collect();

        documents
            .iter()
            .zip(0..means.len())
            .map(|(document, doc)| {
                let topics: [f64; 8] = std::array::from_fn(|t| topic_ranks[t][doc]);

                let broad_estimate = self.estimate(
                    pillar_ranks[0][doc],
                    pillar_ranks[1][doc],
                    pillar_ranks[2][doc],
                );
                let topic_estimate = self.estimate(
                    mean(&topics[0..3]),
                    mean(&topics[3..6]),
                    mean(&topics[6..8]),
                );

                debug!(document = %document, ?broad_estimate, ?topic_estimate, "Scored document");
                EsgScores {
                    document: document.clone(),
                    topics,
                    broad_estimate,
                    topic_estimate,
                    published: broad_estimate.max(topic_estimate),
                }
            })
            .collect()
    }

    fn estimate(&self, environmental: f64, social: f64, governance: f64) -> EsgEstimate {
        EsgEstimate {
            environmental,
            social,
            governance,
            esg: self.weights.combine(environmental, social, governance),
        }
    }
}

fn column(means: &[DocumentMeans], pick: impl Fn(&DocumentMeans) -> f64) -> Vec<f64> {
    means.iter().map(pick).collect()
}

const FOCUS_TERMS: [&str; 3] = ["Environmental", "Social", "Governance"];

/// Indices of pages that mention one of the pillar names (case-sensitive).
pub fn select_esg_pages(pages: &[String]) -> Vec<usize> {
    pages
        .iter()
        .enumerate()
        .filter(|(_, text)| FOCUS_TERMS.iter().any(|term| text.contains(term)))
        .map(|(idx, _)| idx)
        .collect()
}

/// Classifies the pillar-related pages of one report, one batched call per
/// classifier.
#[instrument(skip(pages, broad, topic), fields(page_count = pages.len()))]
pub async fn classify_report(
    document: &str,
    pages: &[String],
    broad: &dyn TextClassifier,
    topic: &dyn TextClassifier,
) -> anyhow::Result<ReportClassifications> {
    let selected: Vec<String> = select_esg_pages(pages)
        .into_iter()
        .map(|idx| pages[idx].clone())
        .collect();
    debug!("{} of {} pages mention an ESG pillar", selected.len(), pages.len());

    if selected.is_empty() {
        return Ok(ReportClassifications {
            document: document.to_string(),
            pages: Vec::new(),
        });
    }

    let broad_results = broad.classify(&selected).await?;
    let topic_results = topic.classify(&selected).await?;
    if broad_results.len() != selected.len() || topic_results.len() != selected.len() {
        anyhow::bail!(
            "classifier returned {} broad and {} topic results for {} pages",
            broad_results.len(),
            topic_results.len(),
            selected.len()
        );
    }

    Ok(ReportClassifications {
        document: document.to_string(),
        pages: broad_results
            .into_iter()
            .zip(topic_results)
            .map(|(broad, topic)| PageClassification { broad, topic })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn page(broad: (&str, f64), topic: (&str, f64)) -> PageClassification {
        PageClassification {
            broad: vec![
                ClassificationResult::new(broad.0, broad.1),
                ClassificationResult::new("None", 1.0 - broad.1),
            ],
            topic: vec![
                ClassificationResult::new(topic.0, topic.1),
                ClassificationResult::new("Non-ESG", 1.0 - topic.1),
            ],
        }
    }

    fn report(name: &str, pages: Vec<PageClassification>) -> ReportClassifications {
        ReportClassifications {
            document: name.to_string(),
            pages,
        }
    }

    #[test]
    fn test_labels_parse() {
        assert_eq!(BroadCategory::from_label("Governance"), Some(BroadCategory::Governance));
        assert_eq!(EsgTopic::from_label("Pollution & Waste"), Some(EsgTopic::PollutionWaste));
        assert_eq!(
            EsgTopic::from_label("Business Ethics & Values").map(|t| t.pillar()),
            Some(BroadCategory::Governance)
        );
        assert_eq!(EsgTopic::from_label("Weather"), None);
        assert_eq!(EsgTopic::NonEsg.score_type(), None);
    }

    #[test]
    fn test_document_means_use_top_labels_only() {
        let means = DocumentMeans::from_pages(&[
            page(("Environmental", 0.9), ("Climate Change", 0.8)),
            page(("Environmental", 0.7), ("Climate Change", 0.6)),
            page(("Governance", 0.6), ("Business Ethics & Values", 0.9)),
            // Top label here is "None" (0.6) so the page adds nothing.
            page(("Social", 0.4), ("Non-ESG", 0.7)),
        ]);

        assert!((means.pillars[0] - 0.8).abs() < 1e-12);
        assert_eq!(means.pillars[1], 0.0);
        assert!((means.pillars[2] - 0.6).abs() < 1e-12);
        assert!((means.topics[0] - 0.7).abs() < 1e-12);
        assert!((means.topics[7] - 0.9).abs() < 1e-12);
        assert_eq!(means.topics[3], 0.0);
    }

    #[test]
    fn test_identical_documents_score_fifty() {
        let scorer = EsgPercentileScorer::default();
        let reports: Vec<_> = (0..4)
            .map(|i| report(&format!("Org{i}"), vec![page(("Social", 0.8), ("Human Capital", 0.7))]))
            .collect();

        for scores in scorer.score(&reports) {
            assert_eq!(scores.topics, [50.0; 8]);
            assert_eq!(scores.published.environmental, 50.0);
            assert_eq!(scores.published.social, 50.0);
            assert_eq!(scores.published.governance, 50.0);
        }
    }

    #[test]
    fn test_published_is_max_of_estimates() {
        let scorer = EsgPercentileScorer::new(EsgWeights {
            environmental: 0.5,
            social: 0.3,
            governance: 0.2,
        });
        let reports = vec![
            report("Leader", vec![page(("Environmental", 0.95), ("Climate Change", 0.9))]),
            report("Laggard", vec![page(("Social", 0.6), ("Human Capital", 0.55))]),
            report("Empty", Vec::new()),
        ];

        let scores = scorer.score(&reports);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].document, "Leader");

        for s in &scores {
            let b = s.broad_estimate;
            let t = s.topic_estimate;
            assert_eq!(s.published.environmental, b.environmental.max(t.environmental));
            assert_eq!(s.published.esg, b.esg.max(t.esg));
            for value in s.topics {
                assert!((0.0..=100.0).contains(&value));
            }
        }

        // Leader is alone at the top of the Environmental pillar.
        assert!((scores[0].broad_estimate.environmental - 83.33333333333333).abs() < 1e-9);
        let composite = (scores[0].topics[0] + scores[0].topics[1] + scores[0].topics[2]) / 3.0;
        assert!((scores[0].topic_estimate.environmental - composite).abs() < 1e-9);
    }

    #[test]
    fn test_weights_are_not_renormalised() {
        let scorer = EsgPercentileScorer::default();
        assert!((scorer.weights().sum() - 1.15).abs() < 1e-12);

        let scores = scorer.score(&[report("Solo", Vec::new())]);
        // Single document: every percentile is 50.
        assert!((scores[0].published.esg - 1.15 * 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch() {
        assert!(EsgPercentileScorer::default().score(&[]).is_empty());
    }

    #[test]
    fn test_to_score_records() {
        let scorer = EsgPercentileScorer::default();
        let scores = scorer.score(&[report("Solo", Vec::new())]);
        let records = scores[0].to_score_records(9, Utc::now());

        assert_eq!(records.len(), 12);
        assert_eq!(records[0].score_type, ScoreType::ClimateChange);
        assert_eq!(records[11].score_type, ScoreType::Esg);
        assert!(records.iter().all(|r| r.entity_id == 9));
        assert_eq!(scores[0].topic(EsgTopic::NonEsg), None);
    }

    #[test]
    fn test_select_esg_pages() {
        let pages = vec![
            "Financial statements".to_string(),
            "Our Environmental commitments".to_string(),
            "social media policy".to_string(),
            "Governance structure".to_string(),
        ];
        assert_eq!(select_esg_pages(&pages), vec![1, 3]);
    }

    struct FixedClassifier(&'static str);

    #[async_trait]
    impl TextClassifier for FixedClassifier {
        async fn classify(
            &self,
            texts: &[String],
        ) -> anyhow::Result<Vec<Vec<ClassificationResult>>> {
            Ok(texts
                .iter()
                .map(|_| vec![ClassificationResult::new(self.0, 0.9)])
                .collect())
        }
    }

    #[tokio::test]
    async fn test_classify_report_only_sends_selected_pages() {
        let pages = vec![
            "Cover page".to_string(),
            "Social impact report".to_string(),
            "Governance and Environmental risk".to_string(),
        ];
        let classified = classify_report(
            "AcmeCorp",
            &pages,
            &FixedClassifier("Social"),
            &FixedClassifier("Human Capital"),
        )
        .await
        .unwrap();

        assert_eq!(classified.document, "AcmeCorp");
        assert_eq!(classified.pages.len(), 2);
        assert_eq!(classified.pages[0].topic[0].label, "Human Capital");
    }

    #[tokio::test]
    async fn test_classify_report_without_esg_pages() {
        let classified = classify_report(
            "Quiet",
            &["Nothing relevant".to_string()],
            &FixedClassifier("Social"),
            &FixedClassifier("Human Capital"),
        )
        .await
        .unwrap();
        assert!(classified.pages.is_empty());
    }
}
