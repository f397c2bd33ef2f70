//! For a set of matches, enumerates bigrams from their shared features
//! and looks each one up against the bigram store for every text in a
//! requested corpus scope.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use string_interner::Symbol;

use crate::bigram::BigramStore;
use crate::error::CoreError;
use crate::feature::{FeatureIndex, FeatureKind};
use crate::matcher::Candidate;
use crate::text::TextId;
use crate::unit::{UnitId, UnitType};

fn canonical(a: FeatureIndex, b: FeatureIndex) -> (FeatureIndex, FeatureIndex) {
    if a.to_usize() <= b.to_usize() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Runs the multitext extension over `matches`, returning one mapping
/// per input match (same order) from bigram to the other units across
/// `corpus` in which that bigram co-occurs.
pub fn run_multitext(
    store: &BigramStore,
    matches: &[Candidate],
    unit_type: UnitType,
    kind: FeatureKind,
    corpus: &[TextId],
    inv_freq: &HashMap<FeatureIndex, f64>,
) -> Result<Vec<HashMap<(FeatureIndex, FeatureIndex), Vec<(UnitId, f64)>>>, CoreError> {
    let mut all_pairs: HashSet<(FeatureIndex, FeatureIndex)> = HashSet::new();
    for candidate in matches {
        for combo in candidate.shared_features.iter().combinations(2) {
            all_pairs.insert(canonical(*combo[0], *combo[1]));
        }
    }
    let all_pairs: Vec<_> = all_pairs.into_iter().collect();

    let mut merged: HashMap<(FeatureIndex, FeatureIndex), Vec<(UnitId, f64)>> = HashMap::new();
    for &text in corpus {
        let hits = store.lookup(text, unit_type, kind, &all_pairs, inv_freq)?;
        for (pair, values) in hits {
            merged.entry(pair).or_default().extend(values);
        }
    }

    Ok(matches
        .iter()
        .map(|candidate| {
            let mut out = HashMap::new();
            for combo in candidate.shared_features.iter().combinations(2) {
                let key = canonical(*combo[0], *combo[1]);
                if let Some(hits) = merged.get(&key) {
                    out.insert(key, hits.clone());
                }
            }
            out
        })
        .collect())
}
