use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::CoreError;
use crate::feature::{FeatureIndex, FeatureKind};
use crate::text::TextId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UnitType {
    Line,
    Phrase,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct UnitId(u64);

impl UnitId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A contiguous slice of a text: an ordered run of word positions with,
/// for each position, the feature indices derived for each feature
/// kind. Positions run `0..n` over word tokens only, with no gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub text_id: TextId,
    pub unit_type: UnitType,
    /// Ordinal index within `(text_id, unit_type)`.
    pub ordinal: u32,
    pub locus_tags: Vec<String>,
    pub snippet: String,
    /// Global token positions in the owning text, in order, one per
    /// word position of this unit.
    pub token_positions: Vec<u32>,
    /// Indexed by local word position; for each position, the feature
    /// indices present at that position, grouped by kind.
    pub features_by_position: Vec<IndexMap<FeatureKind, Vec<FeatureIndex>>>,
}

impl Unit {
    pub fn word_count(&self) -> usize {
        self.features_by_position.len()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.features_by_position.is_empty() {
            return Err(CoreError::EmptyUnit(self.id.get()));
        }
        if self.token_positions.len() != self.features_by_position.len() {
            return Err(CoreError::Internal(format!(
                "unit {} has {} token positions but {} feature rows",
                self.id.get(),
                self.token_positions.len(),
                self.features_by_position.len()
            )));
        }
        Ok(())
    }

    /// For each word position carrying at least one feature of `kind`,
    /// the position and the feature indices present there.
    pub fn positions_features(&self, kind: FeatureKind) -> Vec<(u32, &[FeatureIndex])> {
        self.features_by_position
            .iter()
            .enumerate()
            .filter_map(|(pos, row)| {
                let features = row.get(&kind)?;
                if features.is_empty() {
                    None
                } else {
                    Some((pos as u32, features.as_slice()))
                }
            })
            .collect()
    }

    /// The set of distinct feature indices of `kind` occurring anywhere
    /// in this unit, in first-seen order.
    pub fn feature_set(&self, kind: FeatureKind) -> Vec<FeatureIndex> {
        let mut seen = indexmap::IndexSet::new();
        for row in &self.features_by_position {
            if let Some(features) = row.get(&kind) {
                seen.extend(features.iter().copied());
            }
        }
        seen.into_iter().collect()
    }
}
