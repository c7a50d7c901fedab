//! Engine error types.
//!
//! Grading degrades to zero/default values for every malformed input except
//! an exercise type tag outside the closed set, which callers must handle
//! (reject the submission or record it ungraded).

use thiserror::Error;

/// Errors reported by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The exercise carries a type tag the engine does not know how to grade.
    #[error("unknown exercise type: {0}")]
    UnknownExerciseType(String),
}
