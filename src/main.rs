//! tubenotes - Timestamped key-point summaries of video transcripts
//!
//! Entry point for the tubenotes CLI and HTTP server.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tubenotes::cli::{commands, Cli, Commands};
use tubenotes::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            tubenotes::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Summarize { video } => {
                    commands::summarize_video(&settings, &video).await?;
                }
                Commands::Transcript { video, json } => {
                    commands::print_transcript(&settings, &video, json).await?;
                }
                Commands::Tracks { video } => {
                    commands::list_tracks(&settings, &video).await?;
                }
                Commands::Serve { host, port } => {
                    commands::serve(&settings, host, port).await?;
                }
                Commands::Doctor { json } => {
                    commands::run_doctor(&settings, json).await?;
                }
                Commands::Config(config_cmd) => {
                    commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { shell } => {
                    tubenotes::cli::completions::print(shell);
                }
            }
        }
    }

    Ok(())
}
