pub mod sparse;
pub mod greek_to_latin;

pub use sparse::{candidate_pairs, Candidate, UnitProjection};
