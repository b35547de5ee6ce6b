use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calbot", version, about = "Conversational calendar assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the chat HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Gemini model name (e.g., "gemini-2.0-flash-lite")
        #[arg(short, long)]
        model: Option<String>,

        /// Path to config file (overrides default search)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a single message through the loop and print the reply
    Ask {
        /// The user message
        text: String,

        /// Gemini model name
        #[arg(short, long)]
        model: Option<String>,

        /// Path to config file (overrides default search)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
