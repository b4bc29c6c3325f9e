use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::ExtractionError;
use crate::gdelt::{ArticleRecord, RetrievalError};

/// An organisation to search news coverage for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntity {
    pub id: i64,
    pub name: String,
}

impl TargetEntity {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Name used as the search keyword: trimmed, inner whitespace collapsed.
    pub fn search_name(&self) -> String {
        self.name.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Inclusive search window, `YYYYMMDD` or `YYYYMMDDHHMMSS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: String,
    pub end: String,
}

impl DateWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStage {
    Pending,
    Querying,
    Fetching,
    Recorded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityResult {
    pub entity_id: i64,
    pub has_content: bool,
    pub articles: Vec<ArticleRecord>,
}

impl EntityResult {
    pub fn without_content(entity_id: i64) -> Self {
        Self {
            entity_id,
            has_content: false,
            articles: Vec::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("batch aborted after {consecutive_failures} consecutive failures (last error: {last_error})")]
pub struct BatchAbort {
    pub consecutive_failures: u32,
    pub last_error: String,
}

/// Ordered results; on abort, a strict prefix of the input entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub results: Vec<EntityResult>,
    pub abort: Option<BatchAbort>,
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
