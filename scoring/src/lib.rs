pub mod errors;
pub mod distance;
pub mod score;
pub mod traits;

pub use distance::{frequency_distance, span_distance, DistanceBasis};
pub use score::{tesserae_score, ScoreGate};
pub use traits::{Scorer, ScorerMarker, TesseraeScorer};
