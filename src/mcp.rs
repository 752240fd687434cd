//! MCP server exposing the game tools over stdio.

use crate::error::{PiError, PiErrorKind};
use crate::service::PiService;
use crate::tools::{
    CheckPositionGuessArgs, GameIdArgs, GetPiHintArgs, GuessPiPositionArgs, StartPiGameArgs,
    VerifyPiSequenceArgs,
};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo, Tool};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;
use tracing::{info, instrument, warn};

impl From<PiError> for McpError {
    fn from(err: PiError) -> Self {
        warn!(error = %err, "Tool call failed");
        match err.kind {
            PiErrorKind::NotFound
            | PiErrorKind::InvalidInput
            | PiErrorKind::OutOfRange
            | PiErrorKind::AlreadyTerminal => McpError::invalid_params(err.message, None),
            PiErrorKind::Configuration | PiErrorKind::Upstream => {
                McpError::internal_error(err.message, None)
            }
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to encode result: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Main MCP handler.
pub struct PiToolServer {
    service: PiService,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PiToolServer {
    /// Creates a server driving `service`.
    #[instrument(skip(service))]
    pub fn new(service: PiService) -> Self {
        info!("Creating MCP tool server");
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    /// The underlying service.
    pub fn service(&self) -> &PiService {
        &self.service
    }

    /// Starts a new game.
    #[instrument(skip(self, args))]
    #[tool(description = "Start a new Pi memorization game")]
    pub async fn start_pi_game(
        &self,
        Parameters(args): Parameters<StartPiGameArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.service.start_game(args.mode, args.start_position)?;
        json_result(&response)
    }

    /// Verifies a run of digits.
    #[instrument(skip(self, args), fields(game_id = %args.game_id))]
    #[tool(
        description = "Verify a sequence of Pi digits. Checks each digit in order and stops at the first mistake. User can say '3.14159...' all at once."
    )]
    pub async fn verify_pi_sequence(
        &self,
        Parameters(args): Parameters<VerifyPiSequenceArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.service.verify(&args.game_id, &args.sequence)?;
        json_result(&response)
    }

    /// Reveals upcoming digits.
    #[instrument(skip(self, args), fields(game_id = %args.game_id))]
    #[tool(description = "Get the next N digits as a hint")]
    pub async fn get_pi_hint(
        &self,
        Parameters(args): Parameters<GetPiHintArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .service
            .hint(&args.game_id, args.count.unwrap_or(1))?;
        json_result(&response)
    }

    /// Reports progress.
    #[instrument(skip(self, args), fields(game_id = %args.game_id))]
    #[tool(description = "Get current game status and score")]
    pub async fn get_game_status(
        &self,
        Parameters(args): Parameters<GameIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.service.status(&args.game_id)?;
        json_result(&response)
    }

    /// Ends a game.
    #[instrument(skip(self, args), fields(game_id = %args.game_id))]
    #[tool(description = "End the game")]
    pub async fn end_game(
        &self,
        Parameters(args): Parameters<GameIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.service.end_game(&args.game_id)?;
        json_result(&response)
    }

    /// Starts a position quiz.
    #[instrument(skip(self, args))]
    #[tool(
        description = "Start a position guessing quiz. User guesses what digit is at a specific position in Pi."
    )]
    pub async fn guess_pi_position(
        &self,
        Parameters(args): Parameters<GuessPiPositionArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.service.start_quiz(args.position, args.max_position)?;
        json_result(&response)
    }

    /// Answers a position quiz.
    #[instrument(skip(self, args), fields(quiz_id = %args.quiz_id))]
    #[tool(description = "Check if the user's guess for a specific position is correct")]
    pub async fn check_position_guess(
        &self,
        Parameters(args): Parameters<CheckPositionGuessArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.service.check_quiz(&args.quiz_id, &args.guess)?;
        json_result(&response)
    }
}

impl PiToolServer {
    /// Tools registered with the MCP router.
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for PiToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Pi memorization game. Start a game, then verify the digits the player recalls. \
                 Position quizzes ask for a single decimal of Pi."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
