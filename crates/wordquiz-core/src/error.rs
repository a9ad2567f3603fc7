//! Game engine error types.
//!
//! Narration never produces one of these: speech failures are absorbed by
//! the narrator and reported as a [`NarrationOutcome`](crate::narration::NarrationOutcome).

use thiserror::Error;

/// Errors the engine reports to its caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// A constant would make pool sizing or levelling meaningless.
    #[error("invalid game constants: {0}")]
    InvalidConstants(String),

    /// The catalog unlocks no items, so no challenge can be built.
    #[error("category '{0}' has no items to play")]
    EmptyPool(String),
}
