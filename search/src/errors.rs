use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("search {0} not found")]
    SearchNotFound(uuid::Uuid),
    #[error("text {0} not found")]
    TextNotFound(u64),
    #[error("a non-failed search with the same parameters already exists: {0}")]
    Conflict(uuid::Uuid),
    #[error("ingest failed: {0}")]
    Ingest(String),
    #[error("search was cancelled")]
    Cancelled,
    #[error("internal invariant violated: {0}")]
    Internal(String),
    #[error(transparent)]
    Core(#[from] tesserae_core::error::CoreError),
    #[error(transparent)]
    Scoring(#[from] tesserae_scoring::errors::ScoringError),
}
