//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// tubenotes - Timestamped key-point summaries of video transcripts
#[derive(Parser, Debug)]
#[command(name = "tubenotes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a video into timestamped key points
    Summarize {
        /// Video ID or URL
        video: String,
    },

    /// Print a video's transcript as [MM:SS] lines
    Transcript {
        /// Video ID or URL
        video: String,

        /// Print segments as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// List the caption tracks available for a video
    Tracks {
        /// Video ID or URL
        video: String,
    },

    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration and generator credentials
    Doctor {
        /// Output machine-readable JSON diagnostics
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
