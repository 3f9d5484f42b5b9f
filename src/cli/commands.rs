//! CLI command implementations

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::llm::{build_generator, format_transcript, GeneratorInitError};
use crate::pipeline::Pipeline;
use crate::transcript::{TranscriptResolver, TranscriptSource, VideoId, YouTubeSource};

/// Summarize a video and print its key points
pub async fn summarize_video(settings: &Settings, video: &str) -> Result<()> {
    let video_id = VideoId::parse(video)?;
    let pipeline = Pipeline::from_settings(settings).await?;

    let summary = pipeline
        .summarize(video_id.as_str())
        .await
        .with_context(|| format!("Failed to summarize video {}", video_id))?;

    match summary.language_code.as_deref() {
        Some(lang) => println!("Key points for {} ({}):", summary.video_id, lang),
        None => println!("Key points for {}:", summary.video_id),
    }
    println!();
    println!("{}", summary.summary.trim_end());

    Ok(())
}

/// Print a video's canonical transcript
pub async fn print_transcript(settings: &Settings, video: &str, json: bool) -> Result<()> {
    let video_id = VideoId::parse(video)?;
    let resolver = TranscriptResolver::new(Box::new(YouTubeSource::from_settings(settings)?));

    let transcript = resolver
        .resolve(&video_id)
        .await
        .with_context(|| format!("Failed to get transcript for video {}", video_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
        return Ok(());
    }

    println!("{}", format_transcript(transcript.segments()));
    Ok(())
}

/// List the caption tracks available for a video
pub async fn list_tracks(settings: &Settings, video: &str) -> Result<()> {
    let video_id = VideoId::parse(video)?;
    let source = YouTubeSource::from_settings(settings)?;

    let tracks = source
        .list_tracks(&video_id)
        .await
        .with_context(|| format!("Failed to list transcripts for video {}", video_id))?;

    if tracks.is_empty() {
        println!("No transcripts available for {}", video_id);
        return Ok(());
    }

    println!("{:<10} {:<16} {}", "Language", "Kind", "Name");
    println!("{}", "-".repeat(50));
    for track in tracks.iter() {
        println!(
            "{:<10} {:<16} {}",
            track.language_code,
            track.kind_label(),
            track.name.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

/// Run the HTTP API server
pub async fn serve(settings: &Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    let pipeline = Pipeline::from_settings(&settings).await?;
    crate::server::run(&settings, pipeline).await
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(&settings.redacted())?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: String,
}

#[derive(Serialize)]
struct DoctorReport {
    version: &'static str,
    config_path: String,
    checks: Vec<DoctorCheck>,
}

/// Run diagnostic checks to help troubleshoot local setup issues.
pub async fn run_doctor(settings: &Settings, json: bool) -> Result<()> {
    let report = collect_doctor_report(settings).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("tubenotes doctor ({})", report.version);
    println!("config: {}", report.config_path);
    println!();

    for check in &report.checks {
        println!("{:<10} {:<8} {}", check.name, check.status, check.detail);
    }

    Ok(())
}

async fn collect_doctor_report(settings: &Settings) -> Result<DoctorReport> {
    let config_path = Settings::config_path()?;
    let mut checks = vec![
        DoctorCheck {
            name: "config",
            status: if config_path.exists() { "ok" } else { "default" },
            detail: if config_path.exists() {
                "config file loaded".to_string()
            } else {
                "no config file, using defaults".to_string()
            },
        },
        DoctorCheck {
            name: "source",
            status: "info",
            detail: format!(
                "{} (timeout {}s)",
                settings.source.endpoint, settings.source.timeout_secs
            ),
        },
    ];

    match build_generator(settings) {
        Ok(generator) => {
            checks.push(DoctorCheck {
                name: "llm",
                status: "ok",
                detail: format!("{} / {}", generator.name(), settings.llm.model),
            });
            let (status, detail) = match generator.verify().await {
                Ok(()) => ("ok", "live model lookup succeeded".to_string()),
                Err(e) => ("failed", format!("{:#}", e)),
            };
            checks.push(DoctorCheck {
                name: "verify",
                status,
                detail,
            });
        }
        Err(e) => {
            let status = if matches!(e, GeneratorInitError::MissingApiKey) {
                "missing"
            } else {
                "error"
            };
            checks.push(DoctorCheck {
                name: "llm",
                status,
                detail: e.to_string(),
            });
        }
    }

    Ok(DoctorReport {
        version: crate::VERSION,
        config_path: config_path.display().to_string(),
        checks,
    })
}
