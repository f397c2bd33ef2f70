use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::language::Language;
use crate::unit::UnitType;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TextId(u64);

impl TextId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TextStatus {
    Init,
    Running,
    Done,
    Failed,
}

/// A literary work registered with the engine. Ingestion populates its
/// tokens and units; no search may reference a text whose status is not
/// [`TextStatus::Done`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub id: TextId,
    pub language: Language,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub is_prose: bool,
    pub unit_types: Vec<UnitType>,
    pub path: PathBuf,
    pub content_hash: u32,
    pub status: TextStatus,
    pub status_message: Option<String>,
}

impl Text {
    pub fn new(id: TextId, language: Language, title: impl Into<String>, author: impl Into<String>, path: PathBuf) -> Self {
        Self {
            id,
            language,
            title: title.into(),
            author: author.into(),
            year: None,
            is_prose: false,
            unit_types: vec![UnitType::Line, UnitType::Phrase],
            path,
            content_hash: 0,
            status: TextStatus::Init,
            status_message: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, TextStatus::Done)
    }

    pub fn hash_content(content: &str) -> u32 {
        crc32fast::hash(content.as_bytes())
    }
}
