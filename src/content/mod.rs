//! Article body download and text extraction.

pub mod download;
pub mod errors;
pub mod extract;

pub use download::{DownloadedPage, download};
pub use errors::ExtractionError;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::ingest::ContentSource;

/// Downloads and extracts article bodies one URL at a time. A failing URL is
/// logged and yields an empty string; it never aborts the batch.
#[derive(Debug, Clone, Default)]
pub struct ArticleContentFetcher;

impl ArticleContentFetcher {
    pub fn new() -> Self {
        Self
    }

    /// One entry per input URL, in input order.
    pub async fn fetch(&self, urls: &[String]) -> Vec<String> {
        let mut bodies = Vec::with_capacity(urls.len());
        for url in urls {
            match self.fetch_one(url).await {
                Ok(text) => {
                    debug!("Extracted {} chars from {}", text.len(), url);
                    bodies.push(text);
                }
                Err(e) => {
                    warn!("Failed to extract article from {}: {}", url, e);
                    bodies.push(String::new());
                }
            }
        }
        bodies
    }

    #[instrument(skip(self))]
    pub async fn fetch_one(&self, url: &str) -> Result<String, ExtractionError> {
        let page = download(url).await?;
        extract::article_text(&page.html, &page.url_final).ok_or(ExtractionError::NoReadableText)
    }
}

#[async_trait]
impl ContentSource for ArticleContentFetcher {
    async fn fetch(&self, urls: &[String]) -> Vec<String> {
        ArticleContentFetcher::fetch(self, urls).await
    }
}
