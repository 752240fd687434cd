//! Game service: the one interface every adapter drives.

use crate::error::PiError;
use crate::protocol::{
    EndGameResponse, GameMode, GameStatusResponse, GuessResponse, HintResponse, QuizGuessResponse,
    StartGameResponse, StartQuizResponse, VerifySequenceResponse, ordinal,
};
use crate::session::SessionRegistry;
use can_you_pi_core::{
    DEFAULT_MAX_POSITION, DigitCheck, DigitSource, EndReason, Game, GameError, PositionQuiz,
    verify_batch,
};
use tracing::{info, instrument, warn};

/// Digit source plus session registry, shared by HTTP, MCP and chat.
#[derive(Debug, Clone)]
pub struct PiService {
    digits: DigitSource,
    sessions: SessionRegistry,
    quiz_max_position: usize,
}

impl PiService {
    /// Creates a service with an empty registry.
    #[instrument(skip(digits), fields(total = digits.len()))]
    pub fn new(digits: DigitSource) -> Self {
        Self::with_sessions(digits, SessionRegistry::new())
    }

    /// Creates a service over an existing registry.
    pub fn with_sessions(digits: DigitSource, sessions: SessionRegistry) -> Self {
        Self {
            digits,
            sessions,
            quiz_max_position: DEFAULT_MAX_POSITION,
        }
    }

    /// Sets the default upper bound for random quiz positions.
    pub fn with_quiz_max_position(mut self, quiz_max_position: usize) -> Self {
        self.quiz_max_position = quiz_max_position;
        self
    }

    /// The shared digit source.
    pub fn digits(&self) -> &DigitSource {
        &self.digits
    }

    /// The session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Starts a game in standard or custom mode.
    #[instrument(skip(self))]
    pub fn start_game(
        &self,
        mode: GameMode,
        start_position: Option<usize>,
    ) -> Result<StartGameResponse, PiError> {
        let game = match mode {
            GameMode::Standard => Game::new(self.digits.clone()),
            GameMode::Custom => {
                let position = start_position.ok_or_else(|| {
                    PiError::invalid_input("Custom mode requires start_position")
                })?;
                let cursor = position.checked_sub(1).ok_or(GameError::OutOfRange {
                    position,
                    max: self.digits.len(),
                })?;
                Game::with_cursor(self.digits.clone(), cursor)?
            }
        };

        let current_position = game.cursor() + 1;
        let game_id = self.sessions.create(game);
        info!(game_id = %game_id, %mode, current_position, "Game started");

        Ok(StartGameResponse {
            game_id,
            mode,
            current_position,
            total_digits_available: self.digits.len(),
            message: format!(
                "Game started in {} mode! Say the digits of Pi: 3.1415...",
                mode
            ),
        })
    }

    /// Plays one digit (or an exit keyword).
    #[instrument(skip(self))]
    pub fn play_turn(&self, game_id: &str, input: &str) -> Result<GuessResponse, PiError> {
        self.sessions.with_game(game_id, |game| -> Result<GuessResponse, PiError> {
            if game.is_terminal() {
                return Err(PiError::from(GameError::GameOver {
                    score: game.score(),
                }));
            }

            if game.is_exit_token(input) {
                return Ok(GuessResponse {
                    correct: false,
                    expected_digit: None,
                    current_index: game.cursor(),
                    game_over: true,
                    message: "Game exited".to_string(),
                });
            }

            let check = game.check_input(input.trim())?;

            let message = match check {
                DigitCheck::Correct if game.end_reason() == Some(EndReason::Completed) => {
                    "You completed all digits!".to_string()
                }
                DigitCheck::Correct => "Correct!".to_string(),
                DigitCheck::Wrong { expected } => format!("Wrong! Expected {}", expected),
            };

            Ok(GuessResponse {
                correct: check.is_correct(),
                expected_digit: check.expected(),
                current_index: game.cursor(),
                game_over: game.is_terminal(),
                message,
            })
        })?
    }

    /// Checks a run of digits, stopping at the first mistake.
    #[instrument(skip(self))]
    pub fn verify(&self, game_id: &str, sequence: &str) -> Result<VerifySequenceResponse, PiError> {
        self.sessions.with_game(game_id, |game| -> Result<VerifySequenceResponse, PiError> {
            let result = verify_batch(game, sequence)?;
            let score = result.final_score;

            let response = match (result.wrong_at_position, result.expected_digit, result.got_digit) {
                (Some(position), Some(expected), Some(got)) => VerifySequenceResponse {
                    game_id: game_id.to_string(),
                    sequence_provided: sequence.to_string(),
                    digits_checked: result.digits_checked,
                    correct_count: result.correct_count,
                    all_correct: false,
                    game_over: true,
                    current_score: score,
                    wrong_at_position: Some(position),
                    expected_digit: Some(expected),
                    got_digit: Some(got),
                    final_score: Some(score),
                    correct_sequence: Some(game.sequence_so_far()),
                    message: format!(
                        "Wrong at position {}! You said '{}', but it should be '{}'. Final score: {}",
                        position, got, expected, score
                    ),
                },
                _ => {
                    let message = if result.completed {
                        format!(
                            "All {} digits correct! You completed all {} digits!",
                            result.correct_count,
                            game.total_digits()
                        )
                    } else {
                        format!(
                            "All {} digits correct! Current score: {}. Keep going!",
                            result.correct_count, score
                        )
                    };
                    VerifySequenceResponse {
                        game_id: game_id.to_string(),
                        sequence_provided: sequence.to_string(),
                        digits_checked: result.digits_checked,
                        correct_count: result.correct_count,
                        all_correct: true,
                        game_over: result.game_over,
                        current_score: score,
                        wrong_at_position: None,
                        expected_digit: None,
                        got_digit: None,
                        final_score: result.game_over.then_some(score),
                        correct_sequence: None,
                        message,
                    }
                }
            };
            Ok(response)
        })?
    }

    /// Current progress of a game.
    #[instrument(skip(self))]
    pub fn status(&self, game_id: &str) -> Result<GameStatusResponse, PiError> {
        self.sessions.with_game(game_id, |game| GameStatusResponse {
            game_id: game_id.to_string(),
            current_position: game.cursor() + 1,
            score: game.score(),
            game_over: game.is_terminal(),
            sequence_so_far: game.sequence_so_far(),
            next_10_digits: if game.is_terminal() {
                String::new()
            } else {
                game.upcoming(10).to_string()
            },
            total_digits_available: game.total_digits(),
        })
    }

    /// Reveals the next `count` digits without moving the cursor.
    #[instrument(skip(self))]
    pub fn hint(&self, game_id: &str, count: usize) -> Result<HintResponse, PiError> {
        if count == 0 {
            return Err(GameError::InvalidHintCount.into());
        }

        self.sessions.with_game(game_id, |game| {
            let start_position = game.cursor() + 1;
            if game.is_complete() {
                return HintResponse {
                    game_id: game_id.to_string(),
                    hint: String::new(),
                    start_position,
                    count: 0,
                    message: "You've completed all digits!".to_string(),
                };
            }

            let hint = game.upcoming(count).to_string();
            let count = hint.len();
            HintResponse {
                game_id: game_id.to_string(),
                message: format!("Next {} digit(s): {}", count, hint),
                hint,
                start_position,
                count,
            }
        })
    }

    /// Ends a game and forgets its session.
    #[instrument(skip(self))]
    pub fn end_game(&self, game_id: &str) -> Result<EndGameResponse, PiError> {
        let game = self.sessions.remove_game(game_id)?;
        let final_score = game.score();
        Ok(EndGameResponse {
            game_id: game_id.to_string(),
            final_score,
            sequence: game.sequence_so_far(),
            message: format!("Game ended. You recalled {} digits!", final_score),
        })
    }

    /// Starts a position quiz.
    #[instrument(skip(self))]
    pub fn start_quiz(
        &self,
        position: Option<usize>,
        max_position: Option<usize>,
    ) -> Result<StartQuizResponse, PiError> {
        let max_position = max_position.unwrap_or(self.quiz_max_position);
        let quiz = PositionQuiz::start(&self.digits, position, max_position, &mut rand::rng())?;
        let position = quiz.position();
        let quiz_id = self.sessions.create(quiz);
        info!(quiz_id = %quiz_id, position, "Quiz started");

        Ok(StartQuizResponse {
            quiz_id,
            position,
            message: format!("What is the {} decimal of Pi?", ordinal(position)),
            hint: format!("Position {} (after 3.)", position),
        })
    }

    /// Answers a position quiz. Each quiz takes exactly one valid answer.
    #[instrument(skip(self))]
    pub fn check_quiz(&self, quiz_id: &str, guess: &str) -> Result<QuizGuessResponse, PiError> {
        let guess = guess.trim();
        self.sessions.with_quiz(quiz_id, |quiz| -> Result<QuizGuessResponse, PiError> {
            let outcome = quiz.check(guess).inspect_err(|e| {
                warn!(error = %e, "Quiz answer rejected");
            })?;
            let position = quiz.position();

            let message = if outcome.correct {
                "Correct! Well done!".to_string()
            } else {
                format!(
                    "Wrong! The digit at position {} is {}, not {}.",
                    position,
                    quiz.expected_digit(),
                    guess
                )
            };

            Ok(QuizGuessResponse {
                quiz_id: quiz_id.to_string(),
                position,
                guess: guess.to_string(),
                correct: outcome.correct,
                expected_digit: outcome.expected_digit,
                message,
            })
        })?
    }
}
