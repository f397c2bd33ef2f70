//! Sparse boolean-matrix intersection, generalized over a projection of
//! each unit's word positions to feature indices. The vanilla matcher
//! projects a unit onto its own features directly; the Greek-to-Latin
//! matcher projects Greek units onto their translated Latin indices
//! (see [`crate::matcher::greek_to_latin`]) before reusing this module.

use std::collections::{HashMap, HashSet};

use crate::feature::FeatureIndex;
use crate::unit::{Unit, UnitId};

/// A unit reduced to the feature indices present at each word position,
/// after stopword filtering, feeding a single row of the sparse matrix.
#[derive(Debug, Clone)]
pub struct UnitProjection {
    pub unit_id: UnitId,
    pub positions: Vec<(u32, Vec<FeatureIndex>)>,
}

impl UnitProjection {
    pub fn feature_set(&self) -> HashSet<FeatureIndex> {
        self.positions.iter().flat_map(|(_, f)| f.iter().copied()).collect()
    }

    pub fn positions_of(&self, feature: FeatureIndex) -> Vec<u32> {
        self.positions
            .iter()
            .filter(|(_, f)| f.contains(&feature))
            .map(|(p, _)| *p)
            .collect()
    }
}

/// Builds the native projection of `unit`'s `kind` features, dropping
/// any index present in `stopwords`.
pub fn project_unit(unit: &Unit, kind: crate::feature::FeatureKind, stopwords: &HashSet<FeatureIndex>) -> UnitProjection {
    let positions = unit
        .positions_features(kind)
        .into_iter()
        .map(|(pos, features)| {
            let kept: Vec<FeatureIndex> = features.iter().copied().filter(|f| !stopwords.contains(f)).collect();
            (pos, kept)
        })
        .filter(|(_, f)| !f.is_empty())
        .collect();
    UnitProjection { unit_id: unit.id, positions }
}

/// A candidate unit pair sharing at least two non-stopword features.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source_unit: UnitId,
    pub target_unit: UnitId,
    pub shared_features: Vec<FeatureIndex>,
    /// `(feature, source_position, target_position)` triples where
    /// `feature` occurs at both positions, one entry per shared index
    /// present at both positions.
    pub shared_positions: Vec<(FeatureIndex, u32, u32)>,
}

/// Computes `S · Tᵀ` over the projected source/target rows and returns
/// every candidate whose shared-feature overlap is at least 2.
pub fn candidate_pairs(source: &[UnitProjection], target: &[UnitProjection]) -> Vec<Candidate> {
    let mut target_index: HashMap<FeatureIndex, Vec<usize>> = HashMap::new();
    let target_sets: Vec<HashSet<FeatureIndex>> = target.iter().map(UnitProjection::feature_set).collect();
    for (t_idx, set) in target_sets.iter().enumerate() {
        for &f in set {
            target_index.entry(f).or_default().push(t_idx);
        }
    }

    let mut overlap_counts: HashMap<(usize, usize), u32> = HashMap::new();
    let source_sets: Vec<HashSet<FeatureIndex>> = source.iter().map(UnitProjection::feature_set).collect();
    for (s_idx, set) in source_sets.iter().enumerate() {
        for &f in set {
            if let Some(t_indices) = target_index.get(&f) {
                for &t_idx in t_indices {
                    *overlap_counts.entry((s_idx, t_idx)).or_insert(0) += 1;
                }
            }
        }
    }

    overlap_counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .filter_map(|((s_idx, t_idx), _)| {
            let shared: Vec<FeatureIndex> = source_sets[s_idx].intersection(&target_sets[t_idx]).copied().collect();
            if shared.len() < 2 {
                return None;
            }
            let s_proj = &source[s_idx];
            let t_proj = &target[t_idx];
            let shared_positions = recover_positions(s_proj, t_proj, &shared);
            Some(Candidate {
                source_unit: s_proj.unit_id,
                target_unit: t_proj.unit_id,
                shared_features: shared,
                shared_positions,
            })
        })
        .collect()
}

fn recover_positions(source: &UnitProjection, target: &UnitProjection, shared: &[FeatureIndex]) -> Vec<(FeatureIndex, u32, u32)> {
    let mut positions = Vec::new();
    for &f in shared {
        let src_positions = source.positions_of(f);
        let tgt_positions = target.positions_of(f);
        for &sp in &src_positions {
            for &tp in &tgt_positions {
                positions.push((f, sp, tp));
            }
        }
    }
    positions
}

#[cfg(test)]
mod test {
    use super::*;

    fn projection(unit_id: u64, positions: Vec<(u32, Vec<FeatureIndex>)>) -> UnitProjection {
        UnitProjection { unit_id: UnitId::new(unit_id), positions }
    }

    #[test]
    fn single_shared_feature_is_not_a_candidate() {
        use crate::feature::FeatureRegistry;
        use crate::language::Language;
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let arma = registry.intern(&lang, crate::feature::FeatureKind::Lemmata, "arma");

        let source = vec![projection(1, vec![(0, vec![arma])])];
        let target = vec![projection(2, vec![(0, vec![arma])])];
        assert!(candidate_pairs(&source, &target).is_empty());
    }

    #[test]
    fn two_shared_features_produce_a_candidate() {
        use crate::feature::{FeatureKind, FeatureRegistry};
        use crate::language::Language;
        let registry = FeatureRegistry::new();
        let lang: Language = "latin".into();
        let arma = registry.intern(&lang, FeatureKind::Lemmata, "arma");
        let cano = registry.intern(&lang, FeatureKind::Lemmata, "cano");

        let source = vec![projection(1, vec![(0, vec![arma]), (2, vec![cano])])];
        let target = vec![projection(2, vec![(1, vec![arma]), (3, vec![cano])])];
        let candidates = candidate_pairs(&source, &target);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].shared_features.len(), 2);
        assert_eq!(candidates[0].shared_positions.len(), 2);
    }
}
