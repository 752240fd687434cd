//! Digit recall state machine.
//!
//! A game walks a cursor through the digit source. Each correct digit moves
//! the cursor forward by one; the first wrong digit, an exit request, or
//! reaching the last digit ends the game for good.
//!
//! ```text
//!            correct digit
//!            ┌──────────┐
//!            ▼          │
//!        ┌────────┐─────┘       ┌──────────────────────┐
//!  new ─▶│ Active │────────────▶│ Over(Exited |        │
//!        └────────┘  exit/wrong │      Mismatch |      │
//!                    /last digit│      Completed)      │
//!                               └──────────────────────┘
//! ```

use crate::digits::DigitSource;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Inputs that end a game when submitted as a guess (case-insensitive).
pub const EXIT_TOKENS: [&str; 2] = ["exit", "q"];

/// Why a game stopped accepting digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndReason {
    /// The player asked to quit.
    Exited,
    /// The player submitted a wrong digit.
    Mismatch,
    /// Every available digit was recalled.
    Completed,
}

/// Phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Digits are still being accepted.
    Active,
    /// No further digits are accepted.
    Over(EndReason),
}

/// Outcome of checking one digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitCheck {
    /// The digit matched; the cursor advanced.
    Correct,
    /// The digit did not match; the game is over.
    Wrong {
        /// The digit that was expected at the cursor.
        expected: char,
    },
}

impl DigitCheck {
    /// True for [`DigitCheck::Correct`].
    pub fn is_correct(&self) -> bool {
        matches!(self, DigitCheck::Correct)
    }

    /// The expected digit, for a wrong guess.
    pub fn expected(&self) -> Option<char> {
        match self {
            DigitCheck::Correct => None,
            DigitCheck::Wrong { expected } => Some(*expected),
        }
    }
}

/// True iff `input` is exactly one ASCII decimal digit.
pub fn is_valid_single_digit(input: &str) -> bool {
    let mut chars = input.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit())
}

/// One player's recall attempt.
#[derive(Debug, Clone)]
pub struct Game {
    digits: DigitSource,
    cursor: usize,
    status: GameStatus,
}

impl Game {
    /// Starts a game at the first digit.
    #[instrument(skip(digits), fields(total = digits.len()))]
    pub fn new(digits: DigitSource) -> Self {
        debug!("Creating new game");
        Self {
            digits,
            cursor: 0,
            status: GameStatus::Active,
        }
    }

    /// Starts a game at a 0-based cursor (custom mode).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfRange`] unless `cursor < digits.len()`; the
    /// error reports the 1-indexed position.
    #[instrument(skip(digits), fields(total = digits.len()))]
    pub fn with_cursor(digits: DigitSource, cursor: usize) -> Result<Self, GameError> {
        if cursor >= digits.len() {
            return Err(GameError::OutOfRange {
                position: cursor.saturating_add(1),
                max: digits.len(),
            });
        }

        debug!(cursor, "Creating game at custom position");
        Ok(Self {
            digits,
            cursor,
            status: GameStatus::Active,
        })
    }

    /// Returns true, and ends the game, if `input` is an exit keyword.
    #[instrument(skip(self), fields(cursor = self.cursor))]
    pub fn is_exit_token(&mut self, input: &str) -> bool {
        let input = input.trim();
        let is_exit = EXIT_TOKENS
            .iter()
            .any(|token| input.eq_ignore_ascii_case(token));

        if is_exit {
            self.exit();
        }
        is_exit
    }

    /// Ends an active game as [`EndReason::Exited`].
    pub fn exit(&mut self) {
        if self.status == GameStatus::Active {
            info!(score = self.cursor, "Player exited");
            self.status = GameStatus::Over(EndReason::Exited);
        }
    }

    /// See [`is_valid_single_digit`].
    pub fn is_valid_single_digit(&self, input: &str) -> bool {
        is_valid_single_digit(input)
    }

    /// Compares `digit` with the digit under the cursor.
    ///
    /// A match advances the cursor; recalling the final digit ends the game as
    /// [`EndReason::Completed`]. A mismatch ends the game as
    /// [`EndReason::Mismatch`] without moving the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the game already ended. The cursor
    /// is left untouched.
    #[instrument(skip(self), fields(cursor = self.cursor))]
    pub fn check_digit(&mut self, digit: char) -> Result<DigitCheck, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver { score: self.cursor });
        }

        let Some(expected) = self.digits.digit_at(self.cursor) else {
            self.status = GameStatus::Over(EndReason::Completed);
            return Err(GameError::GameOver { score: self.cursor });
        };

        if digit == expected {
            self.cursor += 1;
            if self.is_complete() {
                info!(score = self.cursor, "All digits recalled");
                self.status = GameStatus::Over(EndReason::Completed);
            }
            Ok(DigitCheck::Correct)
        } else {
            info!(score = self.cursor, %expected, got = %digit, "Wrong digit");
            self.status = GameStatus::Over(EndReason::Mismatch);
            Ok(DigitCheck::Wrong { expected })
        }
    }

    /// Validates `input` as a single digit, then checks it.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDigit`] for anything but one digit, otherwise as
    /// [`Game::check_digit`].
    pub fn check_input(&mut self, input: &str) -> Result<DigitCheck, GameError> {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(digit), None) if digit.is_ascii_digit() => self.check_digit(digit),
            _ => Err(GameError::InvalidDigit {
                input: input.to_string(),
            }),
        }
    }

    /// True once every digit has been recalled.
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.digits.len()
    }

    /// Digits recalled so far; index of the next expected digit.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Same as [`Game::cursor`].
    pub fn score(&self) -> usize {
        self.cursor
    }

    /// Current phase.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// True once the game accepts no more digits.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, GameStatus::Over(_))
    }

    /// Why the game ended, if it has.
    pub fn end_reason(&self) -> Option<EndReason> {
        match self.status {
            GameStatus::Active => None,
            GameStatus::Over(reason) => Some(reason),
        }
    }

    /// The digits recalled so far.
    pub fn recalled(&self) -> &str {
        self.digits.prefix(self.cursor)
    }

    /// Recalled digits written out as Pi, e.g. `3.14159`.
    pub fn sequence_so_far(&self) -> String {
        format!("3.{}", self.recalled())
    }

    /// Up to `count` digits after the cursor.
    pub fn upcoming(&self, count: usize) -> &str {
        self.digits.window(self.cursor, count)
    }

    /// Size of the digit source.
    pub fn total_digits(&self) -> usize {
        self.digits.len()
    }

    /// The shared digit source.
    pub fn digits(&self) -> &DigitSource {
        &self.digits
    }
}
