//! Transcript source boundary

use async_trait::async_trait;
use thiserror::Error;

use crate::transcript::identifier::VideoId;
use crate::transcript::types::{RawTranscript, TrackList, TranscriptTrack};

/// Conditions reported by an upstream transcript source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Video {video} is unavailable: {reason}")]
    VideoUnavailable { video: String, reason: String },

    #[error("No {kind} transcript in '{language}' for video {video}")]
    TrackNotFound {
        video: String,
        language: String,
        kind: &'static str,
    },

    #[error("Transcript service request failed: {0}")]
    Transport(String),

    #[error("Unexpected transcript service response: {0}")]
    InvalidResponse(String),
}

impl SourceError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Upstream provider of caption tracks and their raw entries.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Enumerate every caption track available for a video.
    async fn list_tracks(&self, video: &VideoId) -> Result<TrackList, SourceError>;

    /// Fetch raw entries for a track, or for the source's default choice
    /// when `track` is `None`.
    async fn fetch(
        &self,
        video: &VideoId,
        track: Option<&TranscriptTrack>,
    ) -> Result<RawTranscript, SourceError>;
}
