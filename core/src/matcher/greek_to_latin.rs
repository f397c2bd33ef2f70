//! Static Greek→Latin lemma thesaurus used to compose the vanilla
//! matcher onto a Greek source against a Latin target. Ships as a
//! zstd-compressed bincode blob; the asset format itself is not
//! prescribed beyond "ships compressed".

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use string_interner::Symbol;

use crate::error::CoreError;
use crate::feature::{FeatureIndex, FeatureKind};
use crate::matcher::sparse::UnitProjection;
use crate::unit::Unit;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GreekToLatinDictionary {
    /// Greek lemma index -> Latin lemma indices it translates to.
    forward: HashMap<FeatureIndex, Vec<FeatureIndex>>,
}

impl GreekToLatinDictionary {
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, CoreError> {
        let decoded = zstd::decode_all(bytes).map_err(|e| CoreError::Internal(e.to_string()))?;
        let dict: Self = bincode::deserialize(&decoded)?;
        Ok(dict)
    }

    pub fn to_compressed(&self) -> Result<Vec<u8>, CoreError> {
        let encoded = bincode::serialize(self)?;
        zstd::encode_all(encoded.as_slice(), 0).map_err(|e| CoreError::Internal(e.to_string()))
    }

    pub fn translations(&self, greek_index: FeatureIndex) -> &[FeatureIndex] {
        self.forward.get(&greek_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, greek_index: FeatureIndex, latin_indices: impl IntoIterator<Item = FeatureIndex>) {
        self.forward.entry(greek_index).or_default().extend(latin_indices);
    }

    /// Other Greek indices sharing at least one Latin translation with
    /// `greek_index`, pooled into its adjusted inverse frequency.
    pub fn pooled_with(&self, greek_index: FeatureIndex) -> Vec<FeatureIndex> {
        let my_targets: HashSet<FeatureIndex> = self.translations(greek_index).iter().copied().collect();
        if my_targets.is_empty() {
            return Vec::new();
        }
        self.forward
            .iter()
            .filter(|(idx, _)| **idx != greek_index)
            .filter(|(_, targets)| targets.iter().any(|t| my_targets.contains(t)))
            .map(|(idx, _)| *idx)
            .collect()
    }
}

/// Projects a Greek unit's lemmata positions into the union of their
/// Latin translations, filtered by the Latin stopword set. Position
/// numbering is preserved from the Greek unit.
pub fn project_translated(unit: &Unit, dictionary: &GreekToLatinDictionary, latin_stopwords: &HashSet<FeatureIndex>) -> UnitProjection {
    let positions = unit
        .positions_features(FeatureKind::Lemmata)
        .into_iter()
        .map(|(pos, greek_indices)| {
            let mut latin: Vec<FeatureIndex> = greek_indices
                .iter()
                .flat_map(|g| dictionary.translations(*g).iter().copied())
                .filter(|l| !latin_stopwords.contains(l))
                .collect();
            latin.sort_by_key(|f| f.to_usize());
            latin.dedup();
            (pos, latin)
        })
        .filter(|(_, f)| !f.is_empty())
        .collect();
    UnitProjection { unit_id: unit.id, positions }
}
