use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum DistanceBasis {
    Span,
    Frequency,
}

/// `max - min + 1` over a side's shared word positions; a single shared
/// position yields distance 1. Returns `None` for an empty slice.
pub fn span_distance(positions: &[u32]) -> Option<u32> {
    let min = *positions.iter().min()?;
    let max = *positions.iter().max()?;
    Some(max - min + 1)
}

/// `|pos_a - pos_b| + 1` between the two shared positions whose
/// feature instances carry the smallest weight (the rarest words that
/// participated, per the weighting convention supplied by the caller).
/// A side with only one shared position yields distance 1.
pub fn frequency_distance(weighted_positions: &[(u32, f64)]) -> Option<u32> {
    if weighted_positions.is_empty() {
        return None;
    }
    if weighted_positions.len() == 1 {
        return Some(1);
    }
    let mut sorted: Vec<(u32, f64)> = weighted_positions.to_vec();
    sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).expect("weights are never NaN"));
    let a = sorted[0].0;
    let b = sorted[1].0;
    Some((a as i64 - b as i64).unsigned_abs() as u32 + 1)
}
