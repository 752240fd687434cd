//! Single-question quiz: "what is the Nth decimal of Pi?"

use crate::digits::DigitSource;
use crate::error::GameError;
use crate::game::is_valid_single_digit;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Upper bound for randomly drawn quiz positions when none is configured.
pub const DEFAULT_MAX_POSITION: usize = 100;

/// One position question. It can be answered once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionQuiz {
    position: usize,
    expected_digit: char,
    answered: bool,
}

/// Result of answering a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    /// The guess matched.
    pub correct: bool,
    /// The right digit, reported only for a wrong guess.
    pub expected_digit: Option<char>,
}

impl PositionQuiz {
    /// Creates a quiz for a 1-indexed position.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfRange`] unless `1 <= position <= digits.len()`.
    #[instrument(skip(digits), fields(total = digits.len()))]
    pub fn at(digits: &DigitSource, position: usize) -> Result<Self, GameError> {
        let expected_digit = position
            .checked_sub(1)
            .and_then(|index| digits.digit_at(index))
            .ok_or(GameError::OutOfRange {
                position,
                max: digits.len(),
            })?;

        debug!(position, "Created position quiz");
        Ok(Self {
            position,
            expected_digit,
            answered: false,
        })
    }

    /// Creates a quiz for `position`, or for a position drawn uniformly from
    /// `[1, max_position]` when `position` is `None`.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidMaxPosition`] if a draw is needed and
    /// `max_position` is zero; [`GameError::OutOfRange`] if the position is
    /// past the end of the digits.
    pub fn start<R: Rng>(
        digits: &DigitSource,
        position: Option<usize>,
        max_position: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let position = match position {
            Some(position) => position,
            None if max_position == 0 => return Err(GameError::InvalidMaxPosition),
            None => rng.random_range(1..=max_position),
        };
        Self::at(digits, position)
    }

    /// Answers the quiz.
    ///
    /// # Errors
    ///
    /// [`GameError::AlreadyAnswered`] on every call after the first accepted
    /// one; [`GameError::InvalidDigit`] if `guess` is not a single digit, which
    /// does not use up the answer.
    #[instrument(skip(self), fields(position = self.position))]
    pub fn check(&mut self, guess: &str) -> Result<QuizOutcome, GameError> {
        if self.answered {
            return Err(GameError::AlreadyAnswered);
        }
        if !is_valid_single_digit(guess) {
            return Err(GameError::InvalidDigit {
                input: guess.to_string(),
            });
        }

        self.answered = true;
        let correct = guess.starts_with(self.expected_digit);
        debug!(correct, "Quiz answered");

        Ok(QuizOutcome {
            correct,
            expected_digit: (!correct).then_some(self.expected_digit),
        })
    }

    /// 1-indexed position being asked about.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The right answer.
    pub fn expected_digit(&self) -> char {
        self.expected_digit
    }

    /// True after the first accepted guess.
    pub fn is_answered(&self) -> bool {
        self.answered
    }
}
