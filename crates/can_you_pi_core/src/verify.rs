//! Batch verification: check a whole run of digits in one call.

use crate::error::GameError;
use crate::game::{DigitCheck, Game};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Result of [`verify_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    /// Characters consumed from the normalized run, up to and including a
    /// mismatch; the number of digits checked when there is none.
    pub digits_checked: usize,
    /// Correct digits in this call.
    pub correct_count: usize,
    /// No mismatch occurred.
    pub all_correct: bool,
    /// The digit source ran out during this call.
    pub completed: bool,
    /// The game is over after this call.
    pub game_over: bool,
    /// 1-indexed position of the mismatch.
    pub wrong_at_position: Option<usize>,
    /// Digit expected at the mismatch.
    pub expected_digit: Option<char>,
    /// Digit received at the mismatch.
    pub got_digit: Option<char>,
    /// Cursor after this call.
    pub final_score: usize,
}

/// Strips whitespace and `.` characters, then one leading `3`.
///
/// ```
/// use can_you_pi_core::normalize_sequence;
///
/// assert_eq!(normalize_sequence("3.14 15"), "1415");
/// assert_eq!(normalize_sequence("1415"), "1415");
/// ```
pub fn normalize_sequence(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();

    match cleaned.strip_prefix('3') {
        Some(rest) => rest.to_string(),
        None => cleaned,
    }
}

/// Feeds a run of digits through [`Game::check_digit`], stopping at the
/// first mismatch.
///
/// Non-digit characters in the run are skipped without using up a cursor
/// slot. Digits after a mismatch are never looked at.
///
/// # Errors
///
/// - [`GameError::GameOver`] if the game already ended.
/// - [`GameError::EmptySequence`] if nothing is left after normalization.
#[instrument(skip(game), fields(cursor = game.cursor()))]
pub fn verify_batch(game: &mut Game, raw: &str) -> Result<VerifyResult, GameError> {
    if game.is_terminal() {
        return Err(GameError::GameOver {
            score: game.score(),
        });
    }

    let run = normalize_sequence(raw);
    if run.is_empty() {
        return Err(GameError::EmptySequence);
    }

    let mut correct_count = 0;

    for (index, digit) in run.chars().enumerate() {
        if !digit.is_ascii_digit() {
            continue;
        }
        if game.is_complete() {
            break;
        }

        match game.check_digit(digit)? {
            DigitCheck::Correct => correct_count += 1,
            DigitCheck::Wrong { expected } => {
                debug!(position = game.cursor() + 1, %expected, got = %digit, "Batch stopped at mismatch");
                return Ok(VerifyResult {
                    digits_checked: index + 1,
                    correct_count,
                    all_correct: false,
                    completed: false,
                    game_over: true,
                    wrong_at_position: Some(game.cursor() + 1),
                    expected_digit: Some(expected),
                    got_digit: Some(digit),
                    final_score: game.score(),
                });
            }
        }
    }

    debug!(correct_count, score = game.score(), "Batch verified");
    Ok(VerifyResult {
        digits_checked: correct_count,
        correct_count,
        all_correct: true,
        completed: game.is_complete(),
        game_over: game.is_terminal(),
        wrong_at_position: None,
        expected_digit: None,
        got_digit: None,
        final_score: game.score(),
    })
}
