use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("line {0:?} carries no tag in angle brackets")]
    MissingTag(String),
    #[error("tag {0:?} carries no locus field")]
    MissingLocus(String),
}
