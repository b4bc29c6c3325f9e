//! Maps a three-class sentiment distribution onto a single value in `[-1, 1]`.

use crate::classify::{ClassificationResult, sort_descending};

const THIRD: f64 = 1.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }
}

/// Rescales a Positive/Neutral/Negative distribution.
///
/// Confident Positive maps to 1.0, confident Negative to -1.0 and confident
/// Neutral to 0.0. A Neutral top label leans toward whichever class ranks
/// second. Empty input or an unrecognised top label yields 0.0.
pub fn rescale(distribution: &[ClassificationResult]) -> f64 {
    let mut ranked = distribution.to_vec();
    sort_descending(&mut ranked);

    let Some(top) = ranked.first() else {
        return 0.0;
    };
    let p = top.probability * (2.0 / 3.0);

    let value = match Sentiment::from_label(&top.label) {
        Some(Sentiment::Positive) => THIRD + p,
        Some(Sentiment::Negative) => -THIRD - p,
        Some(Sentiment::Neutral) => {
            let base = p / 2.0 - THIRD;
            let second = ranked.get(1).and_then(|r| Sentiment::from_label(&r.label));
            if second == Some(Sentiment::Positive) {
                -base
            } else {
                base
            }
        }
        None => 0.0,
    };
    value.clamp(-1.0, 1.0)
}

/// Collapses a detailed distribution (labels such as "Environmental Positive")
/// into the three sentiment classes by summing, sorted descending. Labels are
/// matched on their last word, case-insensitively. Returns an empty
/// distribution when nothing matched, so `rescale` yields 0.0.
pub fn collapse_detailed(detailed: &[ClassificationResult]) -> Vec<ClassificationResult> {
    let mut totals = [
        (Sentiment::Positive, 0.0),
        (Sentiment::Neutral, 0.0),
        (Sentiment::Negative, 0.0),
    ];
    let mut matched = false;
    for result in detailed {
        let class = result
            .label
            .split_whitespace()
            .last()
            .and_then(Sentiment::from_label);
        if let Some(class) = class
            && let Some((_, total)) = totals.iter_mut().find(|(s, _)| *s == class)
        {
            *total += result.probability;
            matched = true;
        }
    }
    if !matched {
        return Vec::new();
    }

    let mut collapsed: Vec<ClassificationResult> = totals
        .iter()
        .map(|(sentiment, total)| ClassificationResult::new(sentiment.as_str(), *total))
        .collect();
    sort_descending(&mut collapsed);
    collapsed
}
