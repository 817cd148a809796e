//! Error types for the geometry engine.

/// Failures of the Lorentz transform itself.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RelativityError {
    /// The relative velocity is not strictly inside (-1, 1); γ is undefined there.
    #[error("velocity {velocity} outside the open interval (-1, 1)")]
    Domain { velocity: f64 },
}

/// Failures while building a [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// A physical parameter is out of range. No partial scene is produced.
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error(transparent)]
    Relativity(#[from] RelativityError),
}

/// Convenience result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

/// An empty or inverted age range handed to the marker generator.
///
/// Recoverable: the generator's caller falls back to the terminal marker only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DegenerateRange {
    pub start: f64,
    pub end: f64,
}
