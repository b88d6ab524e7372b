//! CLI entry point for statecraft.

pub mod demos;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::runner::StreamingMode;

/// Statecraft CLI
#[derive(Parser, Debug)]
#[command(name = "statecraft", version, about = "Session state and tools for LLM agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question answered from session state
    Session(SessionArgs),
    /// Ask an agent that can call the clock tool
    Tool(ToolArgs),
}

/// Options shared by every command that talks to a model.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Model identifier (e.g. gemini-2.0-flash or google:gemini-2.5-flash)
    #[arg(short, long, default_value = "gemini-2.0-flash")]
    pub model: String,

    /// Stream partial responses (none, sse)
    #[arg(long, default_value = "none")]
    pub streaming: StreamingMode,
}

/// Arguments for the `session` subcommand.
#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Question to send
    #[arg(long, default_value = "What is Brandon's favorite food?")]
    pub message: String,

    /// TOML file with the initial session state
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Session id (generated when omitted)
    #[arg(long)]
    pub session_id: Option<String>,
}

/// Arguments for the `tool` subcommand.
#[derive(Args, Debug)]
pub struct ToolArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Question to send
    #[arg(long, default_value = "What time is it?")]
    pub message: String,
}
