use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("CSV must contain a \"{column}\" column")]
    Schema { column: String },

    #[error("stored session is unreadable: {0}")]
    PersistenceRead(String),

    #[error("failed to write session: {0}")]
    PersistenceWrite(String),

    #[error("clipboard copy failed: {0}")]
    Clipboard(String),

    #[error("no pair at index {index} (session has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no review session loaded")]
    NoSession,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
