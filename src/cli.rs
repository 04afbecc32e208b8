use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mailpilot")]
#[command(about = "Apple Mail automation tools over MCP", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve the tool catalog over MCP on stdin/stdout.
    Mcp,

    /// Print the tool catalog as JSON.
    Tools {
        /// Pretty-print the definitions
        #[arg(long)]
        pretty: bool,
    },

    /// Invoke one tool directly (see `mailpilot tools` for names).
    Call {
        /// Tool name
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Print the structured details payload instead of the text output
        #[arg(long)]
        json: bool,
    },

    /// Run a raw AppleScript body through the execution engine.
    Script {
        /// Script text
        #[arg(long, conflicts_with = "file")]
        expr: Option<String>,
        /// Read the script from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}
