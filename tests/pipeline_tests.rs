use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use tubenotes::llm::{Summarizer, TextGenerator};
use tubenotes::pipeline::Pipeline;
use tubenotes::transcript::{
    RawTranscript, SourceError, TrackList, TranscriptResolver, TranscriptSource, TranscriptTrack,
    VideoId,
};
use tubenotes::ErrorKind;

/// Serves a fixed set of entries for one video and nothing else.
struct FixtureSource {
    entries: Vec<serde_json::Value>,
}

#[async_trait]
impl TranscriptSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn list_tracks(&self, video: &VideoId) -> Result<TrackList, SourceError> {
        if video.as_str() == "dQw4w9WgXcQ" {
            Ok(TrackList::new(vec![TranscriptTrack::manual("en")]))
        } else {
            Err(SourceError::TranscriptsDisabled(video.to_string()))
        }
    }

    async fn fetch(
        &self,
        video: &VideoId,
        _track: Option<&TranscriptTrack>,
    ) -> Result<RawTranscript, SourceError> {
        if video.as_str() != "dQw4w9WgXcQ" {
            return Err(SourceError::TranscriptsDisabled(video.to_string()));
        }
        Ok(RawTranscript {
            track: Some(TranscriptTrack::manual("en")),
            entries: self.entries.clone(),
        })
    }
}

/// Records every prompt and answers with a canned reply.
struct CapturingGenerator {
    prompts: Arc<Mutex<Vec<String>>>,
    reply: String,
}

#[async_trait]
impl TextGenerator for CapturingGenerator {
    fn name(&self) -> &str {
        "capturing"
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

fn pipeline_with(
    entries: Vec<serde_json::Value>,
    reply: &str,
) -> (Pipeline, Arc<Mutex<Vec<String>>>) {
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let generator = CapturingGenerator {
        prompts: Arc::clone(&prompts),
        reply: reply.to_string(),
    };
    let pipeline = Pipeline::new(
        TranscriptResolver::new(Box::new(FixtureSource { entries })),
        Summarizer::new(Box::new(generator)),
    );
    (pipeline, prompts)
}

#[tokio::test]
async fn url_input_flows_through_to_prompt_and_summary() {
    let (pipeline, prompts) = pipeline_with(
        vec![
            json!({"text": "Hello", "start": 0, "duration": 1.5}),
            json!({"text": "world", "start": 65.2, "duration": 2.0}),
        ],
        "Timestamp: [00:00] - Key Point: greeting",
    );

    let summary = pipeline
        .summarize("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s")
        .await
        .unwrap();

    assert_eq!(summary.video_id.as_str(), "dQw4w9WgXcQ");
    assert_eq!(summary.language_code.as_deref(), Some("en"));
    assert_eq!(summary.segment_count, 2);
    assert_eq!(summary.summary, "Timestamp: [00:00] - Key Point: greeting");

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[00:00] Hello\n[01:05] world"));
}

#[tokio::test]
async fn malformed_entries_are_skipped_not_fatal() {
    let (pipeline, _) = pipeline_with(
        vec![
            json!({"text": "kept", "start": 3}),
            json!(42),
            json!({"unrelated": true}),
            json!("bare string"),
        ],
        "ok",
    );

    let summary = pipeline.summarize("dQw4w9WgXcQ").await.unwrap();
    assert_eq!(summary.segment_count, 2);
}

#[tokio::test]
async fn all_entries_malformed_is_empty_transcript() {
    let (pipeline, prompts) = pipeline_with(vec![json!(null), json!({"foo": 1})], "ok");

    let err = pipeline.summarize("dQw4w9WgXcQ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyTranscript);
    assert!(err.is_client_error());
    assert!(prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn blank_generator_output_is_empty_summary() {
    let (pipeline, _) = pipeline_with(vec![json!({"text": "Hello", "start": 0})], "  \n ");

    let err = pipeline.summarize("dQw4w9WgXcQ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptySummary);
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn disabled_video_never_reaches_generator() {
    let (pipeline, prompts) = pipeline_with(vec![], "unused");

    let err = pipeline.summarize("aaaaaaaaaaa").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TranscriptsDisabled);
    assert!(prompts.lock().unwrap().is_empty());
}
