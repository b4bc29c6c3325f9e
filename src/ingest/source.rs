use async_trait::async_trait;

use crate::gdelt::{ArticleRecord, Filter, RetrievalError};

/// Retrieves article metadata for a compiled filter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn get_articles(&self, filter: &Filter) -> Result<Vec<ArticleRecord>, RetrievalError>;
}

/// Downloads article bodies. Must return exactly one entry per URL, in order,
/// with an empty string for any URL that could not be extracted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, urls: &[String]) -> Vec<String>;
}
