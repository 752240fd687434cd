//! Request and response records shared by the HTTP API, MCP tools and the
//! chat tool dispatcher.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a new game picks its first digit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// Start from the first decimal.
    #[default]
    Standard,
    /// Start from `start_position`.
    Custom,
}

/// Start a game.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StartGameRequest {
    /// `standard` (from the beginning) or `custom` (from `start_position`).
    #[serde(default)]
    pub mode: GameMode,
    /// 1-indexed starting decimal for custom mode.
    #[serde(default)]
    pub start_position: Option<usize>,
}

/// A started game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGameResponse {
    /// Session id for later calls.
    pub game_id: String,
    /// Mode the game started in.
    pub mode: GameMode,
    /// 1-indexed position of the next digit to recall.
    pub current_position: usize,
    /// Size of the digit source.
    pub total_digits_available: usize,
    /// Human-readable summary.
    pub message: String,
}

/// One guessed digit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GuessRequest {
    /// A single digit, or `exit`/`q` to quit.
    pub input: String,
}

/// Result of a single guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResponse {
    /// The digit matched.
    pub correct: bool,
    /// The right digit after a wrong guess.
    pub expected_digit: Option<char>,
    /// Digits recalled so far.
    pub current_index: usize,
    /// No further guesses are accepted.
    pub game_over: bool,
    /// Human-readable summary.
    pub message: String,
}

/// A run of digits to check in one go.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifySequenceRequest {
    /// Digits such as `3.14159` or `14159265`.
    pub sequence: String,
}

/// Result of batch verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySequenceResponse {
    /// Session id.
    pub game_id: String,
    /// The raw input as received.
    pub sequence_provided: String,
    /// Characters consumed, up to and including a mismatch.
    pub digits_checked: usize,
    /// Correct digits in this call.
    pub correct_count: usize,
    /// No mismatch occurred.
    pub all_correct: bool,
    /// No further guesses are accepted.
    pub game_over: bool,
    /// Digits recalled so far.
    pub current_score: usize,
    /// 1-indexed position of the mismatch.
    pub wrong_at_position: Option<usize>,
    /// Digit expected at the mismatch.
    pub expected_digit: Option<char>,
    /// Digit received at the mismatch.
    pub got_digit: Option<char>,
    /// Final score once the game is over.
    pub final_score: Option<usize>,
    /// The correct digits up to the mismatch, e.g. `3.1415`.
    pub correct_sequence: Option<String>,
    /// Human-readable summary.
    pub message: String,
}

/// Progress of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatusResponse {
    /// Session id.
    pub game_id: String,
    /// 1-indexed position of the next digit.
    pub current_position: usize,
    /// Digits recalled so far.
    pub score: usize,
    /// No further guesses are accepted.
    pub game_over: bool,
    /// Recalled digits written out as Pi.
    pub sequence_so_far: String,
    /// The next ten digits; empty once the game is over.
    pub next_10_digits: String,
    /// Size of the digit source.
    pub total_digits_available: usize,
}

/// Query for `GET /game/{id}/hint`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HintQuery {
    /// Number of digits to reveal.
    #[serde(default = "default_hint_count")]
    pub count: usize,
}

fn default_hint_count() -> usize {
    1
}

/// Revealed digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintResponse {
    /// Session id.
    pub game_id: String,
    /// The next digits.
    pub hint: String,
    /// 1-indexed position of the first revealed digit.
    pub start_position: usize,
    /// Number of digits revealed.
    pub count: usize,
    /// Human-readable summary.
    pub message: String,
}

/// Final state of an ended game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndGameResponse {
    /// Session id (no longer valid).
    pub game_id: String,
    /// Digits recalled.
    pub final_score: usize,
    /// Recalled digits written out as Pi.
    pub sequence: String,
    /// Human-readable summary.
    pub message: String,
}

/// Start a position quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StartQuizRequest {
    /// Specific 1-indexed position to ask about; random when omitted.
    #[serde(default)]
    pub position: Option<usize>,
    /// Upper bound for the random position.
    #[serde(default)]
    pub max_position: Option<usize>,
}

/// A started quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartQuizResponse {
    /// Quiz id for the answer.
    pub quiz_id: String,
    /// 1-indexed position being asked about.
    pub position: usize,
    /// The question.
    pub message: String,
    /// Reminder of how positions are counted.
    pub hint: String,
}

/// Answer to a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuizGuessRequest {
    /// A single digit 0-9.
    #[serde(alias = "input")]
    pub guess: String,
}

/// Result of answering a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizGuessResponse {
    /// Quiz id.
    pub quiz_id: String,
    /// 1-indexed position asked about.
    pub position: usize,
    /// The submitted guess.
    pub guess: String,
    /// The guess matched.
    pub correct: bool,
    /// The right digit after a wrong guess.
    pub expected_digit: Option<char>,
    /// Human-readable summary.
    pub message: String,
}

/// Ordinal suffix for quiz questions ("1st", "2nd", "13th", ...).
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
