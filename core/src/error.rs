use thiserror::Error;

use crate::feature::FeatureKind;
use crate::language::Language;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no feature registered for language {language} kind {kind:?} token {token:?}")]
    NotRegistered {
        language: Language,
        kind: FeatureKind,
        token: String,
    },
    #[error("feature index {0} is not registered in this namespace")]
    UnknownIndex(u32),
    #[error("text {0:?} is not done ingesting")]
    TextNotReady(String),
    #[error("unit {0} has no word positions")]
    EmptyUnit(u64),
    #[error("inverse frequency undefined for feature {0} under the chosen basis")]
    UndefinedFrequency(u32),
    #[error("bigram store io error: {0}")]
    Store(#[from] redb::Error),
    #[error("bigram store transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
    #[error("bigram store table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("bigram store commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("bigram store storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("(de)serialization error: {0}")]
    Serde(#[from] bincode::Error),
    #[error("invariant violated: {0}")]
    Internal(String),
}
