use std::time::Duration;
use tokio::time::sleep;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::content::ExtractionError;
use crate::gdelt::{ArticleRecord, Filter, RetrievalError, ValidationError, filters};
use crate::ingest::{
    ArticleSource, BatchAbort, BatchReport, CircuitBreaker, ContentSource, DateWindow,
    EmptyRunMonitor, EntityResult, EntityStage, IngestError, TargetEntity,
    breaker::DEFAULT_FAILURE_THRESHOLD,
};

/// Batch ingestion settings
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Fixed pause after every entity, whatever its outcome.
    pub rate_limit_delay: Duration,
    pub max_consecutive_failures: u32,
    pub max_records: u32,
    pub languages: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            rate_limit_delay: Duration::from_secs(6),
            max_consecutive_failures: DEFAULT_FAILURE_THRESHOLD,
            max_records: filters::DEFAULT_MAX_RECORDS,
            languages: vec!["english".to_string()],
        }
    }
}

/// Drives filter construction, article retrieval and content download across a
/// list of entities, strictly in input order.
pub struct BatchIngestor<A, C> {
    articles: A,
    content: C,
    settings: IngestSettings,
}

impl<A: ArticleSource, C: ContentSource> BatchIngestor<A, C> {
    pub fn new(articles: A, content: C, settings: IngestSettings) -> Self {
        Self {
            articles,
            content,
            settings,
        }
    }

    /// Processes every entity until done or until the circuit breaker opens.
    /// Only a malformed date window is an error; retrieval failures are counted
    /// and reported in the returned `BatchReport`.
    pub async fn run(
        &self,
        entities: &[TargetEntity],
        window: &DateWindow,
    ) -> Result<BatchReport, ValidationError> {
        self.filter_for("", window)?;

        info!(
            "Starting search and download for {} entities between '{}' and '{}'",
            entities.len(),
            window.start,
            window.end
        );

        let mut breaker = CircuitBreaker::new(self.settings.max_consecutive_failures);
        let mut empty_run = EmptyRunMonitor::new(self.settings.max_consecutive_failures);
        let mut results = Vec::with_capacity(entities.len());

        for (idx, entity) in entities.iter().enumerate() {
            info!("Entity: {} ({}/{})", entity.name, idx + 1, entities.len());
            let span = info_span!("entity", id = entity.id);

            match self.process_entity(entity, window).instrument(span).await {
                Ok(articles) => {
                    breaker.record_success();
                    let has_content = !articles.is_empty();
                    if has_content {
                        info!("Has news ({} articles)", articles.len());
                    } else {
                        info!("No news found");
                    }
                    if empty_run.record(!has_content) {
                        warn!(
                            "{} consecutive entities returned no articles; the search service may be degraded",
                            empty_run.consecutive_empty()
                        );
                    }
                    results.push(EntityResult {
                        entity_id: entity.id,
                        has_content,
                        articles,
                    });
                }
                Err(e) => {
                    empty_run.record(false);
                    let failures = breaker.record_failure();
                    warn!(
                        "Failed to retrieve news for entity {}: {} ({} consecutive failures)",
                        entity.id, e, failures
                    );

                    if breaker.is_open() {
                        let abort = BatchAbort {
                            consecutive_failures: failures,
                            last_error: e.to_string(),
                        };
                        error!(
                            "Aborting batch after {}/{} entities: {}",
                            results.len(),
                            entities.len(),
                            abort
                        );
                        return Ok(BatchReport {
                            results,
                            abort: Some(abort),
                        });
                    }

                    results.push(EntityResult::without_content(entity.id));
                }
            }

            // The search API is rate limited and assumes a single caller.
            sleep(self.settings.rate_limit_delay).await;
        }

        info!("Batch complete: {} entities processed", results.len());
        Ok(BatchReport {
            results,
            abort: None,
        })
    }

    async fn process_entity(
        &self,
        entity: &TargetEntity,
        window: &DateWindow,
    ) -> Result<Vec<ArticleRecord>, IngestError> {
        let mut stage = EntityStage::Pending;
        debug!(?stage, "Building filter");

        let filter = self
            .filter_for(&entity.search_name(), window)
            .map_err(RetrievalError::from)?;
        if !filter.has_keywords() {
            warn!("Entity {} has no searchable name", entity.id);
            return Ok(Vec::new());
        }

        stage = EntityStage::Querying;
        debug!(?stage, query = %filter.query_string());
        let mut articles = self.articles.get_articles(&filter).await?;
        if articles.is_empty() {
            return Ok(articles);
        }

        stage = EntityStage::Fetching;
        debug!(?stage, "Downloading {} articles", articles.len());
        let urls: Vec<String> = articles.iter().map(|a| a.url.clone()).collect();
        let bodies = self.content.fetch(&urls).await;
        if bodies.len() != urls.len() {
            return Err(ExtractionError::Misaligned {
                expected: urls.len(),
                got: bodies.len(),
            }
            .into());
        }

        for (article, body) in articles.iter_mut().zip(bodies) {
            article.content = body;
        }

        stage = EntityStage::Recorded;
        debug!(?stage);
        Ok(articles)
    }

    fn filter_for(&self, keyword: &str, window: &DateWindow) -> Result<Filter, ValidationError> {
        Filter::builder()
            .keywords([keyword])
            .languages(self.settings.languages.iter().cloned())
            .start_date(window.start.as_str())
            .end_date(window.end.as_str())
            .max_records(self.settings.max_records)
            .build()
    }
}
