use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("distance must be positive, got source={source_distance} target={target_distance}")]
    NonPositiveDistance { source_distance: u32, target_distance: u32 },
    #[error("cannot score a candidate with no shared positions")]
    NoSharedPositions,
}
