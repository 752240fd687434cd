//! Can You Pi? - how many digits of Pi can you recall?
//!
//! The game rules live in `can_you_pi_core`; this crate wraps them in a
//! session-keyed service and exposes it over several front ends.
//!
//! # Architecture
//!
//! - **Service**: every game operation, keyed by session id
//! - **HTTP**: axum JSON API
//! - **MCP**: stdio tool server for external agents
//! - **Chat**: LLM conversation that plays through tool calls
//! - **Terminal**: line, keystroke and quiz modes plus a chat client
//!
//! # Example
//!
//! ```
//! use can_you_pi::{DigitSource, GameMode, PiService};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = PiService::new(DigitSource::embedded()?);
//! let game = service.start_game(GameMode::Standard, None)?;
//! let result = service.verify(&game.game_id, "3.14159")?;
//! assert!(result.all_correct);
//! assert_eq!(result.current_score, 5);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod chat;
mod cli;
mod config;
mod error;
mod http;
mod llm_client;
mod mcp;
mod protocol;
mod service;
mod session;
mod terminal;
mod tools;

// Crate-level exports - Core game types
pub use can_you_pi_core::{
    DEFAULT_MAX_POSITION, DigitCheck, DigitSource, DigitSourceError, EXIT_TOKENS, EndReason, Game,
    GameError, GameStatus, PositionQuiz, QuizOutcome, VerifyResult, is_valid_single_digit,
    normalize_sequence, verify_batch,
};

// Crate-level exports - Errors and configuration
pub use config::{AppConfig, ConfigError, LlmSettings};
pub use error::{PiError, PiErrorKind};

// Crate-level exports - Service and sessions
pub use protocol::{
    EndGameResponse, GameMode, GameStatusResponse, GuessRequest, GuessResponse, HintQuery,
    HintResponse, QuizGuessRequest, QuizGuessResponse, StartGameRequest, StartGameResponse,
    StartQuizRequest, StartQuizResponse, VerifySequenceRequest, VerifySequenceResponse, ordinal,
};
pub use service::PiService;
pub use session::{Session, SessionHandle, SessionId, SessionRegistry};

// Crate-level exports - LLM client and chat
pub use chat::{
    ChatReply, ChatStore, Conversation, ConversationHandle, SYSTEM_PROMPT, ToolInvocation,
    chat_turn,
};
pub use llm_client::{
    ChatBackend, ChatMessage, ChatRole, FunctionCall, FunctionDefinition, LlmClient, LlmConfig,
    LlmProvider, ToolCall, ToolDefinition,
};
pub use tools::{
    CheckPositionGuessArgs, GameIdArgs, GetPiHintArgs, GuessPiPositionArgs, PiTool,
    StartPiGameArgs, VerifyPiSequenceArgs, call_tool, dispatch,
};

// Crate-level exports - Front ends
pub use cli::{Cli, Command, PlayMode};
pub use http::{
    ApiError, AppState, ChatHistoryResponse, ChatRequest, ChatResponse, create_router,
};
pub use mcp::PiToolServer;
pub use terminal::{
    Key, choose_mode, play_keys, play_lines, play_quiz, print_welcome, prompt_start_position,
    run_chat, run_play,
};
