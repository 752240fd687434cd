//! Errors raised by the game state machine and the position quiz.

use derive_more::{Display, Error};

/// A rejected game or quiz operation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// Input was not exactly one decimal digit.
    #[display("Input must be a single digit (0-9), got {input:?}")]
    InvalidDigit {
        /// The rejected input.
        input: String,
    },
    /// Batch input contained nothing once normalized.
    #[display("No digits provided")]
    EmptySequence,
    /// A random quiz position needs a positive upper bound.
    #[display("Maximum position must be at least 1")]
    InvalidMaxPosition,
    /// A hint must ask for at least one digit.
    #[display("Hint count must be at least 1")]
    InvalidHintCount,
    /// A 1-indexed position outside the available digits.
    #[display("Position {position} out of range. Must be between 1 and {max}")]
    OutOfRange {
        /// Requested 1-indexed position.
        position: usize,
        /// Number of available digits.
        max: usize,
    },
    /// The game already ended.
    #[display("Game is already over. Final score: {score}")]
    GameOver {
        /// Digits recalled before the game ended.
        score: usize,
    },
    /// The quiz was already answered.
    #[display("Quiz already answered")]
    AlreadyAnswered,
}
