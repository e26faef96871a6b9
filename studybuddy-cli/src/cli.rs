use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use studybuddy_core::config::ProviderKind;

#[derive(Debug, Parser)]
#[command(name = "studybuddy")]
#[command(about = "Photograph or type a homework question and get a step-by-step explanation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base directory for config and history (default: the platform config dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Solve a photographed question
    Scan {
        /// Image file (JPEG, PNG, WebP, GIF, BMP)
        image: PathBuf,

        #[command(flatten)]
        adjust: AdjustArgs,
    },

    /// Ask a typed or dictated question
    Ask {
        /// Question text; words are joined with spaces
        #[arg(conflicts_with = "transcript")]
        text: Vec<String>,

        /// JSON-lines speech transcript to flatten into the question
        #[arg(long, value_name = "FILE")]
        transcript: Option<PathBuf>,
    },

    /// Browse saved answers
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Show or change settings
    Config(ConfigArgs),

    /// Menu-driven session
    Interactive,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct AdjustArgs {
    /// Brightness percent (50-200)
    #[arg(long, default_value_t = 100)]
    pub brightness: u16,

    /// Contrast percent (50-200)
    #[arg(long, default_value_t = 100)]
    pub contrast: u16,

    /// Convert to black and white
    #[arg(long)]
    pub grayscale: bool,
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List saved answers, newest first
    List,
    /// Print one saved answer
    Show { id: String },
    /// Delete one saved answer
    Delete { id: String },
    /// Delete all saved answers
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Print the current settings
    #[arg(long)]
    pub show: bool,

    /// Store an API key for the active provider in the OS keyring
    #[arg(long, value_name = "KEY")]
    pub set_api_key: Option<String>,

    /// Remove stored API keys
    #[arg(long, conflicts_with = "set_api_key")]
    pub clear_api_key: bool,

    /// Solver provider (gemini, openai-compatible)
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,
}
