//! tubenotes - Timestamped key-point summaries of video transcripts
//!
//! A request flows through two stages: the transcript resolver turns a video
//! identifier into a canonical transcript, and the summarizer turns that
//! transcript into key points anchored to `MM:SS` timestamps.

pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod transcript;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::llm::SummaryError;
use crate::transcript::TranscriptError;

/// Classified failure of a summarization request
#[derive(Error, Debug)]
pub enum TubenotesError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Caller-visible failure conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidIdentifier,
    TranscriptsDisabled,
    TrackListingFailed,
    NoUsableTranscript,
    EmptyTranscript,
    UpstreamUnavailable,
    GenerationFailed,
    EmptySummary,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl TubenotesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transcript(e) => match e {
                TranscriptError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
                TranscriptError::TranscriptsDisabled { .. } => ErrorKind::TranscriptsDisabled,
                TranscriptError::TrackListingFailed { .. } => ErrorKind::TrackListingFailed,
                TranscriptError::NoUsableTranscript { .. } => ErrorKind::NoUsableTranscript,
                TranscriptError::EmptyTranscript { .. } => ErrorKind::EmptyTranscript,
                TranscriptError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            },
            Self::Summary(e) => match e {
                SummaryError::GenerationFailed { .. } => ErrorKind::GenerationFailed,
                SummaryError::EmptySummary => ErrorKind::EmptySummary,
            },
        }
    }

    /// 400-class when true, 500-class otherwise
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Transcript(e) => e.is_client_error(),
            Self::Summary(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TubenotesError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "tubenotes";
