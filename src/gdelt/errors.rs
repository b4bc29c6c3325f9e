use thiserror::Error;

/// Malformed or insufficient query input. Always raised before any I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query mode '{0}' is not supported (supported: artlist)")]
    UnsupportedMode(String),

    #[error("invalid {field} '{value}': expected YYYYMMDD or YYYYMMDDHHMMSS")]
    InvalidDate { field: &'static str, value: String },

    #[error("record cap must be greater than zero")]
    ZeroRecordCap,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode json content after {max_tries} repair attempts")]
    Exhausted { max_tries: usize },

    #[error("json content cannot be repaired: {reason}")]
    Irrecoverable { reason: String },
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("search api returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl RetrievalError {
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}
