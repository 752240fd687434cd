//! Application error type shared by every adapter.

use can_you_pi_core::GameError;
use derive_more::{Display, Error};
use serde::Serialize;
use tracing::instrument;

/// Category of a failed operation. Adapters map these to their own failure
/// representation (HTTP status, MCP error, tool result, terminal message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, strum::AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PiErrorKind {
    /// Unknown session, quiz or conversation id.
    #[display("Not found")]
    NotFound,
    /// Malformed guess, empty sequence, bad count.
    #[display("Invalid input")]
    InvalidInput,
    /// Position outside the available digits.
    #[display("Out of range")]
    OutOfRange,
    /// The game or quiz no longer accepts input.
    #[display("Already over")]
    AlreadyTerminal,
    /// Missing credential or bad configuration.
    #[display("Configuration error")]
    Configuration,
    /// The LLM provider call failed or timed out.
    #[display("Upstream error")]
    Upstream,
}

/// Error with kind and caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{}: {} at {}:{}", kind, message, file, line)]
pub struct PiError {
    /// Error category.
    pub kind: PiErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PiError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: PiErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Unknown id.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PiErrorKind::NotFound, message)
    }

    /// Rejected input.
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(PiErrorKind::InvalidInput, message)
    }

    /// Missing or bad configuration.
    #[track_caller]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(PiErrorKind::Configuration, message)
    }

    /// LLM provider failure.
    #[track_caller]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(PiErrorKind::Upstream, message)
    }
}

impl From<GameError> for PiError {
    #[track_caller]
    fn from(err: GameError) -> Self {
        let kind = match &err {
            GameError::InvalidDigit { .. }
            | GameError::EmptySequence
            | GameError::InvalidMaxPosition
            | GameError::InvalidHintCount => PiErrorKind::InvalidInput,
            GameError::OutOfRange { .. } => PiErrorKind::OutOfRange,
            GameError::GameOver { .. } | GameError::AlreadyAnswered => {
                PiErrorKind::AlreadyTerminal
            }
        };
        Self::new(kind, err.to_string())
    }
}
