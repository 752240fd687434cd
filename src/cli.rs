//! Command-line interface for can_you_pi.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Can You Pi? - How many digits of Pi can you recall?
#[derive(Parser, Debug)]
#[command(name = "can_you_pi")]
#[command(about = "Pi digit memorization game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults apply if it is missing)
    #[arg(long, global = true, default_value = "can_you_pi.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play in the terminal
    Play {
        /// Game mode; a menu is shown when omitted
        #[arg(short, long, value_enum)]
        mode: Option<PlayMode>,

        /// Starting position for custom mode (1-indexed)
        #[arg(short, long)]
        start: Option<usize>,

        /// Read single key presses instead of lines
        #[arg(long)]
        keys: bool,
    },

    /// Chat with an LLM that runs the game
    Chat,

    /// Run the MCP tool server (stdio mode)
    Mcp,
}

/// Terminal game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlayMode {
    /// Recall from the first decimal
    Standard,
    /// Recall from a chosen position
    Custom,
    /// Name the digit at random positions
    Quiz,
}
