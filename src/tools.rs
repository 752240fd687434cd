//! Game tools exposed to language models.
//!
//! The same seven tools back the MCP server and the chat loop's
//! function calling. Dispatch only translates arguments into
//! [`PiService`] calls; it never touches game state itself.

use crate::error::PiError;
use crate::llm_client::{FunctionDefinition, ToolDefinition};
use crate::protocol::GameMode;
use crate::service::PiService;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// Arguments for `start_pi_game`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StartPiGameArgs {
    /// "standard" (from the beginning) or "custom" (from a specific position).
    #[serde(default)]
    pub mode: GameMode,
    /// Starting position for custom mode (1-indexed).
    #[serde(default)]
    pub start_position: Option<usize>,
}

/// Arguments for `verify_pi_sequence`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyPiSequenceArgs {
    /// The game ID.
    pub game_id: String,
    /// The sequence of digits to verify (e.g. '3.14159' or '14159265').
    pub sequence: String,
}

/// Arguments for `get_pi_hint`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetPiHintArgs {
    /// The game ID.
    pub game_id: String,
    /// Number of digits to show (default 1).
    #[serde(default)]
    pub count: Option<usize>,
}

/// Arguments naming a game.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GameIdArgs {
    /// The game ID.
    pub game_id: String,
}

/// Arguments for `guess_pi_position`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GuessPiPositionArgs {
    /// Specific position to ask about (1-indexed). Random when omitted.
    #[serde(default)]
    pub position: Option<usize>,
    /// Maximum position for random selection (default 100).
    #[serde(default)]
    pub max_position: Option<usize>,
}

/// Arguments for `check_position_guess`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckPositionGuessArgs {
    /// The quiz ID from guess_pi_position.
    pub quiz_id: String,
    /// The user's digit guess (single digit 0-9).
    pub guess: String,
}

/// Every tool a model can call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum PiTool {
    /// Start a new game.
    StartPiGame,
    /// Check a run of digits.
    VerifyPiSequence,
    /// Reveal upcoming digits.
    GetPiHint,
    /// Report progress.
    GetGameStatus,
    /// End a game.
    EndGame,
    /// Start a position quiz.
    GuessPiPosition,
    /// Answer a position quiz.
    CheckPositionGuess,
}

impl PiTool {
    /// Description shown to the model.
    pub fn description(self) -> &'static str {
        match self {
            PiTool::StartPiGame => "Start a new Pi memorization game",
            PiTool::VerifyPiSequence => {
                "Verify a sequence of Pi digits. Checks each digit in order and stops at the first \
                 mistake. User can say '3.14159...' all at once."
            }
            PiTool::GetPiHint => "Get the next N digits as a hint",
            PiTool::GetGameStatus => "Get current game status and score",
            PiTool::EndGame => "End the game",
            PiTool::GuessPiPosition => {
                "Start a position guessing quiz. User guesses what digit is at a specific position \
                 in Pi."
            }
            PiTool::CheckPositionGuess => {
                "Check if the user's guess for a specific position is correct"
            }
        }
    }

    /// JSON Schema of the tool's arguments.
    pub fn parameters(self) -> Value {
        let schema = match self {
            PiTool::StartPiGame => schemars::schema_for!(StartPiGameArgs),
            PiTool::VerifyPiSequence => schemars::schema_for!(VerifyPiSequenceArgs),
            PiTool::GetPiHint => schemars::schema_for!(GetPiHintArgs),
            PiTool::GetGameStatus | PiTool::EndGame => schemars::schema_for!(GameIdArgs),
            PiTool::GuessPiPosition => schemars::schema_for!(GuessPiPositionArgs),
            PiTool::CheckPositionGuess => schemars::schema_for!(CheckPositionGuessArgs),
        };

        let mut value = schema.to_value();
        if let Some(object) = value.as_object_mut() {
            object.remove("$schema");
            object.remove("title");
        }
        value
    }

    /// Function definition in the chat completions format.
    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.as_ref().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters(),
            },
        }
    }

    /// Definitions of every tool.
    pub fn definitions() -> Vec<ToolDefinition> {
        PiTool::iter().map(PiTool::definition).collect()
    }
}

fn parse_args<T: DeserializeOwned>(arguments: &str) -> Result<T, PiError> {
    let arguments = match arguments.trim() {
        "" | "null" => "{}",
        trimmed => trimmed,
    };
    serde_json::from_str(arguments)
        .map_err(|e| PiError::invalid_input(format!("Invalid tool arguments: {}", e)))
}

fn to_json<T: Serialize>(value: Result<T, PiError>) -> Result<Value, PiError> {
    let value = value?;
    serde_json::to_value(value)
        .map_err(|e| PiError::invalid_input(format!("Failed to encode tool result: {}", e)))
}

/// Runs a tool against the service.
///
/// # Errors
///
/// Service errors, and invalid input for undecodable arguments.
#[instrument(skip(service, arguments))]
pub fn call_tool(service: &PiService, tool: PiTool, arguments: &str) -> Result<Value, PiError> {
    debug!(arguments, "Calling tool");
    match tool {
        PiTool::StartPiGame => {
            let args: StartPiGameArgs = parse_args(arguments)?;
            to_json(service.start_game(args.mode, args.start_position))
        }
        PiTool::VerifyPiSequence => {
            let args: VerifyPiSequenceArgs = parse_args(arguments)?;
            to_json(service.verify(&args.game_id, &args.sequence))
        }
        PiTool::GetPiHint => {
            let args: GetPiHintArgs = parse_args(arguments)?;
            to_json(service.hint(&args.game_id, args.count.unwrap_or(1)))
        }
        PiTool::GetGameStatus => {
            let args: GameIdArgs = parse_args(arguments)?;
            to_json(service.status(&args.game_id))
        }
        PiTool::EndGame => {
            let args: GameIdArgs = parse_args(arguments)?;
            to_json(service.end_game(&args.game_id))
        }
        PiTool::GuessPiPosition => {
            let args: GuessPiPositionArgs = parse_args(arguments)?;
            to_json(service.start_quiz(args.position, args.max_position))
        }
        PiTool::CheckPositionGuess => {
            let args: CheckPositionGuessArgs = parse_args(arguments)?;
            to_json(service.check_quiz(&args.quiz_id, &args.guess))
        }
    }
}

/// Runs a tool by name and always produces a JSON result for the model.
/// Failures become `{"error": ...}` objects.
#[instrument(skip(service, arguments))]
pub fn dispatch(service: &PiService, name: &str, arguments: &str) -> Value {
    let Ok(tool) = PiTool::from_str(name) else {
        warn!(tool = name, "Unknown tool requested");
        return json!({ "error": format!("Unknown tool: {}", name) });
    };

    match call_tool(service, tool, arguments) {
        Ok(value) => value,
        Err(e) => {
            warn!(tool = name, error = %e, "Tool call failed");
            json!({ "error": e.message, "kind": e.kind })
        }
    }
}
