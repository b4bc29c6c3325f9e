pub mod client;
pub mod decoder;
pub mod errors;
pub mod filters;
pub mod types;

pub use client::{ClientSettings, GdeltClient};
pub use errors::{DecodeError, RetrievalError, ValidationError};
pub use filters::{Filter, FilterBuilder};
pub use types::{ArticleRecord, QueryMode};
