//! Can You Pi? core - digit recall game logic
//!
//! Everything in here is pure game logic over a fixed string of Pi's
//! fractional digits. Transport concerns (HTTP, MCP, terminal, LLM chat)
//! live in the `can_you_pi` crate and call into these types.
//!
//! # Example
//!
//! ```
//! use can_you_pi_core::{DigitSource, Game, verify_batch};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let digits = DigitSource::embedded()?;
//! let mut game = Game::new(digits);
//!
//! let result = verify_batch(&mut game, "3.14159")?;
//! assert!(result.all_correct);
//! assert_eq!(game.cursor(), 5);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod digits;
mod error;
mod game;
mod quiz;
mod verify;

pub use digits::{DigitSource, DigitSourceError};
pub use error::GameError;
pub use game::{DigitCheck, EXIT_TOKENS, EndReason, Game, GameStatus, is_valid_single_digit};
pub use quiz::{DEFAULT_MAX_POSITION, PositionQuiz, QuizOutcome};
pub use verify::{VerifyResult, normalize_sequence, verify_batch};
