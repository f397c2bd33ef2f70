use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::params::SearchParams;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SearchId(Uuid);

impl SearchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn get(self) -> Uuid {
        self.0
    }
}

impl Default for SearchId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SearchType {
    Vanilla,
    Multitext,
    GreekToLatin,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SearchStatus {
    Init,
    Running,
    Done,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub stage: String,
    pub completion: f32,
}

/// The 28-day window after which a search with no recent query is
/// eligible for garbage collection.
pub const SEARCH_TTL: Duration = Duration::from_secs(28 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    pub id: SearchId,
    pub search_type: SearchType,
    pub parameters: SearchParams,
    pub status: SearchStatus,
    pub message: Option<String>,
    pub progress: Vec<Progress>,
    pub last_queried: SystemTime,
    /// For a multitext search, the vanilla search it is keyed to.
    pub results_id: Option<SearchId>,
}

impl Search {
    pub fn new(search_type: SearchType, parameters: SearchParams, results_id: Option<SearchId>) -> Self {
        Self {
            id: SearchId::new(),
            search_type,
            parameters,
            status: SearchStatus::Init,
            message: None,
            progress: Vec::new(),
            last_queried: SystemTime::now(),
            results_id,
        }
    }

    pub fn touch(&mut self) {
        self.last_queried = SystemTime::now();
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        now.duration_since(self.last_queried).map(|age| age >= SEARCH_TTL).unwrap_or(false)
    }

    pub fn start(&mut self) {
        self.status = SearchStatus::Running;
    }

    pub fn finish(&mut self) {
        self.status = SearchStatus::Done;
        for stage in &mut self.progress {
            stage.completion = 1.0;
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = SearchStatus::Failed;
        self.message = Some(message.into());
    }

    pub fn report_stage(&mut self, stage: impl Into<String>, completion: f32) {
        let stage = stage.into();
        if let Some(existing) = self.progress.iter_mut().find(|p| p.stage == stage) {
            existing.completion = completion;
        } else {
            self.progress.push(Progress { stage, completion });
        }
    }
}
