use thiserror::Error;

/// The crate-wide error type returned by the engine and ingest pipeline.
/// Wraps each collaborator crate's own error type and adds the handful
/// of failure modes that only make sense at the orchestration layer.
#[derive(Debug, Error)]
pub enum TesseraeError {
    #[error("text {0:?} not found")]
    TextNotFound(u64),
    #[error("text {0:?} is already registered")]
    TextAlreadyRegistered(u64),
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] tesserae_tokenizer::error::TokenizerError),
    #[error("failed to read config: {0}")]
    Config(String),
    #[error(transparent)]
    Core(#[from] tesserae_core::error::CoreError),
    #[error(transparent)]
    Scoring(#[from] tesserae_scoring::errors::ScoringError),
    #[error(transparent)]
    Search(#[from] tesserae_search::errors::SearchError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
