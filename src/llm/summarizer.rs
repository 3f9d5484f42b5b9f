//! Key-point summary generation over a canonical transcript

use thiserror::Error;
use tracing::{error, info};

use crate::config::Settings;
use crate::llm::client::{init_generator, GeneratorInitError, TextGenerator};
use crate::llm::prompts::{build_key_points_prompt, format_transcript};
use crate::transcript::Transcript;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Failed to generate summary via {provider}: {reason}")]
    GenerationFailed { provider: String, reason: String },

    #[error("Generated summary is empty")]
    EmptySummary,
}

pub struct Summarizer {
    generator: Box<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Build the configured generator, verifying it when `llm.verify_on_startup` is set.
    pub async fn from_settings(settings: &Settings) -> Result<Self, GeneratorInitError> {
        let generator = init_generator(settings, settings.llm.verify_on_startup).await?;
        Ok(Self::new(generator))
    }

    /// The exact prompt sent for `transcript`.
    pub fn prompt_for(&self, transcript: &Transcript) -> String {
        let block = format_transcript(transcript.segments());
        info!("Formatted transcript length: {} chars", block.len());
        build_key_points_prompt(&block)
    }

    pub async fn summarize(&self, transcript: &Transcript) -> Result<String, SummaryError> {
        let prompt = self.prompt_for(transcript);

        let summary = self.generator.generate(&prompt).await.map_err(|e| {
            error!("Error from {}: {:#}", self.generator.name(), e);
            SummaryError::GenerationFailed {
                provider: self.generator.name().to_string(),
                reason: format!("{:#}", e),
            }
        })?;

        if summary.trim().is_empty() {
            error!("Generated summary is empty");
            return Err(SummaryError::EmptySummary);
        }

        info!(
            "Summary generated for video {} ({} chars)",
            transcript.video_id(),
            summary.len()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Segment, VideoId};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct ScriptedGenerator {
        reply: Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(anyhow::Error::msg)
        }
    }

    fn summarizer(reply: Result<&str, &str>) -> (Summarizer, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let generator = ScriptedGenerator {
            reply: reply.map(str::to_string).map_err(str::to_string),
            prompts: prompts.clone(),
        };
        (Summarizer::new(Box::new(generator)), prompts)
    }

    fn transcript() -> Transcript {
        Transcript::new(
            VideoId::parse("dQw4w9WgXcQ").unwrap(),
            None,
            vec![Segment::new(0.0, "Hello"), Segment::new(65.0, "world")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn summary_is_passed_through_unmodified() {
        let reply = "  not the requested layout at all\n";
        let (summarizer, prompts) = summarizer(Ok(reply));

        let summary = summarizer.summarize(&transcript()).await.unwrap();
        assert_eq!(summary, reply);

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("[00:00] Hello\n[01:05] world"));
    }

    #[tokio::test]
    async fn whitespace_summary_is_empty() {
        let (summarizer, _) = summarizer(Ok(" \n\t "));
        assert!(matches!(
            summarizer.summarize(&transcript()).await,
            Err(SummaryError::EmptySummary)
        ));
    }

    #[tokio::test]
    async fn generator_failure_is_attempted_once() {
        let (summarizer, prompts) = summarizer(Err("quota exceeded"));

        match summarizer.summarize(&transcript()).await {
            Err(SummaryError::GenerationFailed { provider, reason }) => {
                assert_eq!(provider, "scripted");
                assert!(reason.contains("quota exceeded"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }
}
