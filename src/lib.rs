//! External signal collection and scoring for organisations: news coverage
//! from GDELT, website and social reach, and ESG report classification.

pub mod classify;
pub mod config;
pub mod content;
pub mod gdelt;
pub mod ingest;
pub mod insights;
pub mod orgs;
pub mod scoring;
