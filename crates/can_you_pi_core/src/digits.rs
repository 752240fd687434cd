//! The fixed sequence of Pi's fractional digits.

use derive_more::{Display, Error};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fractional digits of Pi shipped with the crate (10 000 digits after `3.`).
const EMBEDDED_DIGITS: &str = include_str!("../assets/pi_decimals.txt");

/// Immutable, shared sequence of decimal digits.
///
/// Cloning is cheap: every clone points at the same buffer, so each game
/// holds a handle to the one copy loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitSource {
    digits: Arc<str>,
}

impl DigitSource {
    /// Parses a digit source from text. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`DigitSourceError::Empty`] if no digits remain after trimming and
    /// [`DigitSourceError::InvalidCharacter`] on the first non-digit character.
    #[instrument(skip(text), fields(text_len = text.len()))]
    pub fn parse(text: &str) -> Result<Self, DigitSourceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DigitSourceError::Empty);
        }

        if let Some((index, found)) = trimmed
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
        {
            return Err(DigitSourceError::InvalidCharacter { index, found });
        }

        debug!(digits = trimmed.len(), "Parsed digit source");
        Ok(Self {
            digits: Arc::from(trimmed),
        })
    }

    /// Returns the digits compiled into the crate.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled resource is corrupt.
    pub fn embedded() -> Result<Self, DigitSourceError> {
        Self::parse(EMBEDDED_DIGITS)
    }

    /// Loads digits from a text file.
    ///
    /// # Errors
    ///
    /// Returns [`DigitSourceError::Io`] if the file cannot be read, or any
    /// error from [`DigitSource::parse`].
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DigitSourceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DigitSourceError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let source = Self::parse(&text)?;
        info!(digits = source.len(), "Loaded digit source from file");
        Ok(source)
    }

    /// Number of digits available.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Always false for a successfully constructed source.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Digit at a 0-based index.
    pub fn digit_at(&self, index: usize) -> Option<char> {
        self.digits.as_bytes().get(index).map(|b| char::from(*b))
    }

    /// The first `count` digits, clamped to the available length.
    pub fn prefix(&self, count: usize) -> &str {
        &self.digits[..count.min(self.len())]
    }

    /// Up to `count` digits starting at a 0-based index.
    pub fn window(&self, start: usize, count: usize) -> &str {
        let start = start.min(self.len());
        let end = start.saturating_add(count).min(self.len());
        &self.digits[start..end]
    }

    /// All digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.digits
    }
}

/// Failure to build a [`DigitSource`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum DigitSourceError {
    /// The digit file could not be read.
    #[display("Failed to read digit file {path}: {message}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },
    /// No digits were present.
    #[display("Digit source is empty")]
    Empty,
    /// A character other than `0`-`9` was found.
    #[display("Invalid character {found:?} at index {index} in digit source")]
    InvalidCharacter {
        /// Byte offset of the character.
        index: usize,
        /// The offending character.
        found: char,
    },
}
