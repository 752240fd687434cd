//! Can You Pi? - Unified CLI
//!
//! HTTP server, terminal game, LLM chat client and MCP tool server.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use can_you_pi::{
    AppConfig, AppState, ChatBackend, ChatStore, Cli, Command, LlmClient, PiError, PiService,
    PiToolServer, SessionRegistry, create_router, run_chat, run_play,
};
use clap::Parser;
use rmcp::ServiceExt;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Interactive modes own the terminal, so they stay quiet by default.
    let default_filter = match cli.command {
        Command::Serve { .. } => "info,can_you_pi=debug",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Serve { host, port } => run_http_server(config.with_bind(host, port)).await,
        Command::Play { mode, start, keys } => {
            let digits = config.digit_source()?;
            let stdin = io::stdin();
            run_play(
                &digits,
                *config.quiz_max_position(),
                mode,
                start,
                keys,
                &mut stdin.lock(),
                &mut io::stdout(),
            )?;
            Ok(())
        }
        Command::Chat => run_chat_client(config).await,
        Command::Mcp => run_mcp_server(config).await,
    }
}

fn build_service(config: &AppConfig, sessions: SessionRegistry) -> Result<PiService> {
    let digits = config.digit_source()?;
    Ok(PiService::with_sessions(digits, sessions)
        .with_quiz_max_position(*config.quiz_max_position()))
}

fn build_backend(config: &AppConfig) -> Result<Arc<dyn ChatBackend>, PiError> {
    let llm_config = config.llm().create_llm_config()?;
    let client = LlmClient::new(llm_config)?;
    Ok(Arc::new(client))
}

/// Run the HTTP game server
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_http_server(config: AppConfig) -> Result<()> {
    info!("Starting Can You Pi HTTP server");

    let sessions = SessionRegistry::new();
    let service = build_service(&config, sessions.clone())?;
    let chats = ChatStore::new();

    let backend = build_backend(&config);
    if let Err(e) = &backend {
        warn!(error = %e.message, "Chat disabled");
    }

    if let Some(max_idle) = config.idle_timeout() {
        let period = max_idle.min(Duration::from_secs(60));
        let chats = chats.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                sessions.evict_idle(max_idle);
                chats.evict_idle(max_idle);
            }
        });
    }

    let app = create_router(AppState::new(service, chats, backend));
    let addr = format!("{}:{}", config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Run the terminal chat client
async fn run_chat_client(config: AppConfig) -> Result<()> {
    let backend = build_backend(&config)?;
    let service = build_service(&config, SessionRegistry::new())?;
    let stdin = io::stdin();
    run_chat(
        backend.as_ref(),
        &service,
        &mut stdin.lock(),
        &mut io::stdout(),
    )
    .await?;
    Ok(())
}

/// Run the MCP tool server (stdio mode)
async fn run_mcp_server(config: AppConfig) -> Result<()> {
    info!("Starting Can You Pi MCP server");

    let server = PiToolServer::new(build_service(&config, SessionRegistry::new())?);

    info!("Server ready - connect via MCP protocol");
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
