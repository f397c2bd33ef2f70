use crate::errors::ScoringError;

/// A marker for scorers that can be referenced dynamically without
/// generics (e.g. stored behind a `Box<dyn Scorer>`).
pub trait ScorerMarker: Scorer + Sync + Send {}

/// Computes the final score of a candidate pair from its shared
/// inverse-frequency weights and per-side distances.
pub trait Scorer {
    fn score(&self, shared_inverse_frequencies: &[f64], source_distance: u32, target_distance: u32) -> Result<f64, ScoringError>;
}

impl<T> Scorer for Box<T>
where
    T: Scorer + ?Sized,
{
    fn score(&self, shared_inverse_frequencies: &[f64], source_distance: u32, target_distance: u32) -> Result<f64, ScoringError> {
        self.as_ref().score(shared_inverse_frequencies, source_distance, target_distance)
    }
}

impl<T> ScorerMarker for Box<T> where T: ScorerMarker {}

/// The fixed deterministic Tesserae log-score.
#[derive(Debug, Default, Copy, Clone)]
pub struct TesseraeScorer;

impl Scorer for TesseraeScorer {
    fn score(&self, shared_inverse_frequencies: &[f64], source_distance: u32, target_distance: u32) -> Result<f64, ScoringError> {
        crate::score::tesserae_score(shared_inverse_frequencies, source_distance, target_distance)
    }
}

impl ScorerMarker for TesseraeScorer {}
