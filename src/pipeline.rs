//! Per-request summarization pipeline: resolve, then summarize

use anyhow::Result as AnyResult;
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::llm::Summarizer;
use crate::transcript::{TranscriptResolver, VideoId, YouTubeSource};
use crate::Result;

/// Result of a successful summarization request
#[derive(Debug, Clone, Serialize)]
pub struct VideoSummary {
    pub video_id: VideoId,
    pub language_code: Option<String>,
    pub segment_count: usize,
    pub summary: String,
}

pub struct Pipeline {
    resolver: TranscriptResolver,
    summarizer: Summarizer,
}

impl Pipeline {
    pub fn new(resolver: TranscriptResolver, summarizer: Summarizer) -> Self {
        Self {
            resolver,
            summarizer,
        }
    }

    /// Wire the YouTube source and the configured generator.
    pub async fn from_settings(settings: &Settings) -> AnyResult<Self> {
        let source = YouTubeSource::from_settings(settings)?;
        let summarizer = Summarizer::from_settings(settings).await?;
        Ok(Self::new(
            TranscriptResolver::new(Box::new(source)),
            summarizer,
        ))
    }

    /// Summarize the video named by `input` (bare ID or URL).
    pub async fn summarize(&self, input: &str) -> Result<VideoSummary> {
        let transcript = self.resolver.resolve_input(input).await?;
        info!(
            "Transcript for video {} has {} segments",
            transcript.video_id(),
            transcript.len()
        );

        let summary = self.summarizer.summarize(&transcript).await?;

        Ok(VideoSummary {
            video_id: transcript.video_id().clone(),
            language_code: transcript.language_code().map(str::to_string),
            segment_count: transcript.len(),
            summary,
        })
    }
}
