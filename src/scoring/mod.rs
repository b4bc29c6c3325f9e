//! Normalisation of raw signals into bounded, comparable scores.
//!
//! All scorers are total: missing data scores 0.0 instead of failing, so batch
//! outputs stay aligned with their inputs.

pub mod digital;
pub mod esg;
pub mod percentile;
pub mod record;
pub mod sentiment;
pub mod website;

pub use digital::{DigitalIdentityBatch, DigitalIdentityInput, DigitalScore, PopulationStats, digital_score};
pub use esg::{EsgPercentileScorer, EsgScores, EsgWeights};
pub use record::{ScoreRecord, ScoreType};
pub use website::{Logistic, SeoReport, SeoSignal};
