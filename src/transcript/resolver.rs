//! Transcript resolution with language fallback
//!
//! Resolution tries the source's default choice first. If that fails, the
//! available tracks are listed and turned into an ordered candidate plan
//! (manual English, auto-generated English, then everything else). Candidates
//! are fetched one at a time; the first success is normalized into a
//! canonical [`Transcript`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::transcript::identifier::{IdentifierError, VideoId};
use crate::transcript::normalize::Normalizer;
use crate::transcript::source::{SourceError, TranscriptSource};
use crate::transcript::types::{RawTranscript, TrackList, Transcript, TranscriptTrack};

/// English variants, in preference order within each English tier
pub const ENGLISH_VARIANTS: &[&str] = &["en", "en-US", "en-GB"];

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("Transcripts are disabled for this video")]
    TranscriptsDisabled { video: String },

    #[error("Could not list transcripts for video {video}: {source}")]
    TrackListingFailed {
        video: String,
        #[source]
        source: SourceError,
    },

    #[error("No usable transcript found for video {video} ({attempted} candidates tried)")]
    NoUsableTranscript { video: String, attempted: usize },

    #[error("Retrieved transcript for video {video} is empty ({skipped} entries skipped)")]
    EmptyTranscript { video: String, skipped: usize },

    #[error("Transcript service unavailable: {source}")]
    UpstreamUnavailable {
        video: String,
        #[source]
        source: SourceError,
    },
}

impl TranscriptError {
    /// Whether the failure is attributable to the request rather than the service
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::TrackListingFailed { source, .. } => {
                matches!(source, SourceError::VideoUnavailable { .. })
            }
            Self::UpstreamUnavailable { .. } => false,
            _ => true,
        }
    }
}

/// Stage of the fallback preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    ManualEnglish,
    GeneratedEnglish,
    AnyOther,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManualEnglish => write!(f, "manual English"),
            Self::GeneratedEnglish => write!(f, "auto-generated English"),
            Self::AnyOther => write!(f, "any language"),
        }
    }
}

/// One fetch attempt in the fallback plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub tier: Tier,
    pub track: TranscriptTrack,
}

/// Order the available tracks into fetch candidates. Each track appears once.
pub fn plan_candidates(tracks: &TrackList) -> Vec<Candidate> {
    let mut plan: Vec<Candidate> = Vec::with_capacity(tracks.len());

    let english_tier = |plan: &mut Vec<Candidate>, tier: Tier, generated: bool| {
        for code in ENGLISH_VARIANTS {
            if let Some(track) = tracks.find(code, generated) {
                plan.push(Candidate {
                    tier,
                    track: track.clone(),
                });
            }
        }
    };
    english_tier(&mut plan, Tier::ManualEnglish, false);
    english_tier(&mut plan, Tier::GeneratedEnglish, true);

    for track in tracks.iter() {
        if !plan.iter().any(|c| &c.track == track) {
            plan.push(Candidate {
                tier: Tier::AnyOther,
                track: track.clone(),
            });
        }
    }

    plan
}

/// Resolves a video identifier into a canonical transcript
pub struct TranscriptResolver {
    source: Box<dyn TranscriptSource>,
    normalizer: Normalizer,
}

impl TranscriptResolver {
    pub fn new(source: Box<dyn TranscriptSource>) -> Self {
        Self {
            source,
            normalizer: Normalizer::default(),
        }
    }

    /// Parse raw user input and resolve it.
    pub async fn resolve_input(&self, input: &str) -> Result<Transcript, TranscriptError> {
        let video = VideoId::parse(input)?;
        self.resolve(&video).await
    }

    pub async fn resolve(&self, video: &VideoId) -> Result<Transcript, TranscriptError> {
        info!("Resolving transcript for video {} via {}", video, self.source.name());

        match self.source.fetch(video, None).await {
            Ok(raw) => {
                info!("Retrieved default transcript for video {}", video);
                return self.finish(video, raw);
            }
            Err(e) => {
                warn!("Failed to get transcript with default language: {}", e);
            }
        }

        let tracks = self
            .source
            .list_tracks(video)
            .await
            .map_err(|e| listing_error(video, e))?;

        info!(
            "Available transcripts for video {}: {:?}",
            video,
            tracks.language_codes()
        );

        let candidates = plan_candidates(&tracks);
        for candidate in &candidates {
            debug!(
                "Trying {} transcript in {}",
                candidate.tier, candidate.track.language_code
            );
            match self.source.fetch(video, Some(&candidate.track)).await {
                Ok(raw) => {
                    info!(
                        "Using {} transcript in: {}",
                        candidate.tier, candidate.track.language_code
                    );
                    let raw = RawTranscript {
                        track: raw.track.or_else(|| Some(candidate.track.clone())),
                        entries: raw.entries,
                    };
                    return self.finish(video, raw);
                }
                Err(e) => {
                    warn!(
                        "Failed to get {} transcript in {}: {}",
                        candidate.tier, candidate.track.language_code, e
                    );
                }
            }
        }

        warn!(
            "Failed to retrieve any transcript despite available languages: {:?}",
            tracks.language_codes()
        );
        Err(TranscriptError::NoUsableTranscript {
            video: video.to_string(),
            attempted: candidates.len(),
        })
    }

    fn finish(&self, video: &VideoId, raw: RawTranscript) -> Result<Transcript, TranscriptError> {
        let normalized = self.normalizer.normalize(&raw.entries);
        let skipped = normalized.skipped;

        Transcript::new(video.clone(), raw.track, normalized.segments).ok_or_else(|| {
            warn!("No transcript content could be processed for video {}", video);
            TranscriptError::EmptyTranscript {
                video: video.to_string(),
                skipped,
            }
        })
    }
}

fn listing_error(video: &VideoId, err: SourceError) -> TranscriptError {
    let video = video.to_string();
    match err {
        SourceError::TranscriptsDisabled(_) => TranscriptError::TranscriptsDisabled { video },
        source if source.is_transport() => TranscriptError::UpstreamUnavailable { video, source },
        source => TranscriptError::TrackListingFailed { video, source },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::types::RawEntry;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Key = (String, bool);

    /// In-memory source: a default result plus per-track results
    #[derive(Default)]
    struct FakeSource {
        default: Option<Vec<RawEntry>>,
        listing: Option<Result<Vec<TranscriptTrack>, SourceError>>,
        fetchable: HashMap<Key, Vec<RawEntry>>,
        attempts: Arc<Mutex<Vec<Key>>>,
    }

    impl FakeSource {
        fn with_tracks(tracks: Vec<TranscriptTrack>) -> Self {
            Self {
                listing: Some(Ok(tracks)),
                ..Default::default()
            }
        }

        fn serving(mut self, track: &TranscriptTrack, entries: Vec<RawEntry>) -> Self {
            self.fetchable.insert(
                (track.language_code.clone(), track.is_auto_generated),
                entries,
            );
            self
        }
    }

    #[async_trait]
    impl TranscriptSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn list_tracks(&self, _video: &VideoId) -> Result<TrackList, SourceError> {
            match &self.listing {
                Some(Ok(tracks)) => Ok(TrackList::new(tracks.clone())),
                Some(Err(e)) => Err(e.clone()),
                None => Ok(TrackList::default()),
            }
        }

        async fn fetch(
            &self,
            video: &VideoId,
            track: Option<&TranscriptTrack>,
        ) -> Result<RawTranscript, SourceError> {
            let Some(track) = track else {
                return self
                    .default
                    .clone()
                    .map(|entries| RawTranscript {
                        track: None,
                        entries,
                    })
                    .ok_or_else(|| SourceError::TrackNotFound {
                        video: video.to_string(),
                        language: "en".to_string(),
                        kind: "default",
                    });
            };

            let key = (track.language_code.clone(), track.is_auto_generated);
            self.attempts.lock().unwrap().push(key.clone());
            self.fetchable
                .get(&key)
                .cloned()
                .map(|entries| RawTranscript {
                    track: None,
                    entries,
                })
                .ok_or_else(|| SourceError::Transport("simulated failure".to_string()))
        }
    }

    fn video() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn hello() -> Vec<RawEntry> {
        vec![json!({"text": "Hello", "start": 0.0})]
    }

    fn resolve(source: FakeSource) -> Result<Transcript, TranscriptError> {
        let resolver = TranscriptResolver::new(Box::new(source));
        tokio_test::block_on(resolver.resolve(&video()))
    }

    #[test]
    fn plan_orders_tiers_and_variants() {
        let tracks = TrackList::new(vec![
            TranscriptTrack::generated("de"),
            TranscriptTrack::generated("en"),
            TranscriptTrack::manual("en-GB"),
            TranscriptTrack::manual("fr"),
            TranscriptTrack::manual("en"),
            TranscriptTrack::generated("en-US"),
        ]);

        let plan: Vec<(Tier, String, bool)> = plan_candidates(&tracks)
            .into_iter()
            .map(|c| (c.tier, c.track.language_code, c.track.is_auto_generated))
            .collect();

        assert_eq!(
            plan,
            vec![
                (Tier::ManualEnglish, "en".to_string(), false),
                (Tier::ManualEnglish, "en-GB".to_string(), false),
                (Tier::GeneratedEnglish, "en".to_string(), true),
                (Tier::GeneratedEnglish, "en-US".to_string(), true),
                (Tier::AnyOther, "de".to_string(), true),
                (Tier::AnyOther, "fr".to_string(), false),
            ]
        );
    }

    #[test]
    fn default_fetch_wins_without_listing() {
        let source = FakeSource {
            default: Some(hello()),
            listing: Some(Err(SourceError::Transport("must not be called".into()))),
            ..Default::default()
        };

        let transcript = resolve(source).unwrap();
        assert_eq!(transcript.segments()[0].text, "Hello");
        assert_eq!(transcript.language_code(), None);
    }

    #[test]
    fn manual_english_beats_generated_english() {
        let manual = TranscriptTrack::manual("en");
        let generated = TranscriptTrack::generated("en");
        let source = FakeSource::with_tracks(vec![generated.clone(), manual.clone()])
            .serving(&generated, vec![json!({"text": "auto", "start": 0})])
            .serving(&manual, vec![json!({"text": "manual", "start": 0})]);
        let attempts = source.attempts.clone();

        let transcript = resolve(source).unwrap();
        assert_eq!(transcript.segments()[0].text, "manual");
        assert_eq!(transcript.track(), Some(&manual));
        assert_eq!(attempts.lock().unwrap().len(), 1);
    }

    #[test]
    fn falls_back_to_other_language_after_english_tiers() {
        let fr = TranscriptTrack::manual("fr");
        let source = FakeSource::with_tracks(vec![fr.clone()]).serving(
            &fr,
            vec![
                json!({"text": "Bonjour", "start": 0}),
                json!({"text": "le monde", "start": 2.5}),
            ],
        );

        let transcript = resolve(source).unwrap();
        assert_eq!(transcript.language_code(), Some("fr"));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn candidate_failures_are_recovered() {
        let en = TranscriptTrack::manual("en");
        let en_us = TranscriptTrack::generated("en-US");
        let es = TranscriptTrack::generated("es");
        let source = FakeSource::with_tracks(vec![en.clone(), en_us.clone(), es.clone()])
            .serving(&es, vec![json!({"text": "hola", "start": 1})]);
        let attempts = source.attempts.clone();

        let transcript = resolve(source).unwrap();
        assert_eq!(transcript.language_code(), Some("es"));

        let tried: Vec<String> = attempts.lock().unwrap().iter().map(|k| k.0.clone()).collect();
        assert_eq!(tried, vec!["en", "en-US", "es"]);
    }

    #[test]
    fn exhausted_candidates_yield_no_usable_transcript() {
        let source = FakeSource::with_tracks(vec![
            TranscriptTrack::manual("en"),
            TranscriptTrack::generated("ja"),
        ]);

        match resolve(source) {
            Err(TranscriptError::NoUsableTranscript { attempted, .. }) => assert_eq!(attempted, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn zero_tracks_yield_no_usable_transcript() {
        let source = FakeSource::with_tracks(Vec::new());
        assert!(matches!(
            resolve(source),
            Err(TranscriptError::NoUsableTranscript { attempted: 0, .. })
        ));
    }

    #[test]
    fn uncoercible_entries_yield_empty_transcript() {
        let source = FakeSource {
            default: Some(vec![json!(null), json!({"tStartMs": 0})]),
            ..Default::default()
        };

        match resolve(source) {
            Err(TranscriptError::EmptyTranscript { skipped, .. }) => assert_eq!(skipped, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn listing_failures_are_classified() {
        let cases = vec![
            (
                SourceError::TranscriptsDisabled("dQw4w9WgXcQ".into()),
                "disabled",
            ),
            (SourceError::Transport("timeout".into()), "upstream"),
            (
                SourceError::VideoUnavailable {
                    video: "dQw4w9WgXcQ".into(),
                    reason: "Video unavailable".into(),
                },
                "listing",
            ),
        ];

        for (err, expected) in cases {
            let source = FakeSource {
                listing: Some(Err(err)),
                ..Default::default()
            };
            let got = match resolve(source) {
                Err(TranscriptError::TranscriptsDisabled { .. }) => "disabled",
                Err(TranscriptError::UpstreamUnavailable { .. }) => "upstream",
                Err(e @ TranscriptError::TrackListingFailed { .. }) => {
                    assert!(e.is_client_error());
                    "listing"
                }
                other => panic!("unexpected result: {:?}", other),
            };
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn invalid_input_is_rejected_before_any_fetch() {
        let resolver = TranscriptResolver::new(Box::new(FakeSource::default()));
        let result = tokio_test::block_on(resolver.resolve_input("https://vimeo.com/1"));
        assert!(matches!(result, Err(TranscriptError::InvalidIdentifier(_))));
    }
}
