use tw_core::TwError;

/// Result alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while building or loading a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A world operation was rejected.
    #[error(transparent)]
    World(#[from] TwError),

    /// The scenario describes an impossible world.
    #[error("invalid scenario: {0}")]
    Scenario(String),

    /// The scenario file is not valid JSON.
    #[error("scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
}
