//! Wires the core sparse matcher and the scoring crate together: builds
//! projections, runs candidate generation, and scores each candidate in
//! parallel fork-join fashion per §5's concurrency model.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use tesserae_core::feature::FeatureIndex;
use tesserae_core::matcher::{candidate_pairs, Candidate, UnitProjection};
use tesserae_scoring::{frequency_distance, span_distance, tesserae_score, DistanceBasis, ScoreGate};

use crate::errors::SearchError;

fn dedup_sorted(mut positions: Vec<u32>) -> Vec<u32> {
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// A scored candidate pair, ready to be materialized into a `Match`.
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Scores every candidate independently and in parallel; each thread
/// computes into its own partition, matching §5's no-shared-mutable-
/// state guarantee (only the immutable `inv_freq` table is shared).
pub fn score_candidates(
    candidates: Vec<Candidate>,
    inv_freq: &HashMap<FeatureIndex, f64>,
    distance_basis: DistanceBasis,
    gate: ScoreGate,
) -> Vec<ScoredCandidate> {
    candidates
        .into_par_iter()
        .filter_map(|candidate| score_one(candidate, inv_freq, distance_basis, gate))
        .collect()
}

fn score_one(candidate: Candidate, inv_freq: &HashMap<FeatureIndex, f64>, distance_basis: DistanceBasis, gate: ScoreGate) -> Option<ScoredCandidate> {
    let (source_distance, target_distance) = match distance_basis {
        DistanceBasis::Span => {
            let src: Vec<u32> = dedup_sorted(candidate.shared_positions.iter().map(|(_, s, _)| *s).collect());
            let tgt: Vec<u32> = dedup_sorted(candidate.shared_positions.iter().map(|(_, _, t)| *t).collect());
            (span_distance(&src)?, span_distance(&tgt)?)
        }
        DistanceBasis::Frequency => {
            let weighted_src: Vec<(u32, f64)> = candidate
                .shared_positions
                .iter()
                .map(|(f, s, _)| (*s, inv_freq.get(f).copied().unwrap_or(f64::INFINITY)))
                .collect();
            let weighted_tgt: Vec<(u32, f64)> = candidate
                .shared_positions
                .iter()
                .map(|(f, _, t)| (*t, inv_freq.get(f).copied().unwrap_or(f64::INFINITY)))
                .collect();
            (frequency_distance(&weighted_src)?, frequency_distance(&weighted_tgt)?)
        }
    };

    if source_distance + target_distance > gate.max_distance {
        return None;
    }

    let shared_set: HashSet<FeatureIndex> = candidate.shared_features.iter().copied().collect();
    let weights: Vec<f64> = shared_set.iter().filter_map(|f| inv_freq.get(f).copied()).collect();
    if weights.len() < 2 {
        return None;
    }

    let score = tesserae_score(&weights, source_distance, target_distance).ok()?;
    if !gate.accepts(source_distance, target_distance, score) {
        return None;
    }

    Some(ScoredCandidate { candidate, score })
}

pub fn projections_for(
    units: &[tesserae_core::unit::Unit],
    kind: tesserae_core::feature::FeatureKind,
    stopwords: &HashSet<FeatureIndex>,
) -> Vec<UnitProjection> {
    units.iter().map(|u| tesserae_core::matcher::sparse::project_unit(u, kind, stopwords)).collect()
}

pub fn vanilla_candidates(
    source_units: &[tesserae_core::unit::Unit],
    target_units: &[tesserae_core::unit::Unit],
    kind: tesserae_core::feature::FeatureKind,
    stopwords: &HashSet<FeatureIndex>,
) -> Result<Vec<Candidate>, SearchError> {
    let source = projections_for(source_units, kind, stopwords);
    let target = projections_for(target_units, kind, stopwords);
    Ok(candidate_pairs(&source, &target))
}
