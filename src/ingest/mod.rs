//! Rate-limited batch ingestion of news coverage for a list of entities.

pub mod breaker;
pub mod orchestrator;
pub mod source;
pub mod types;

pub use breaker::{CircuitBreaker, EmptyRunMonitor};
pub use orchestrator::{BatchIngestor, IngestSettings};
pub use source::{ArticleSource, ContentSource};
pub use types::{
    BatchAbort, BatchReport, DateWindow, EntityResult, EntityStage, IngestError, TargetEntity,
};
