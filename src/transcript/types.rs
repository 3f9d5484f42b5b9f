//! Transcript data model

use serde::{Deserialize, Serialize};

use crate::transcript::identifier::VideoId;

/// Raw transcript entry as delivered by a source, before normalization.
pub type RawEntry = serde_json::Value;

/// A timestamped piece of spoken text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Offset from the start of the video, in seconds
    pub start_seconds: f64,

    /// Caption text
    pub text: String,
}

impl Segment {
    pub fn new(start_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            text: text.into(),
        }
    }
}

/// Metadata for one language/origin variant of a video's captions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTrack {
    /// Language code (e.g. `en`, `en-US`, `fr`)
    pub language_code: String,

    /// Human-readable language name, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the track was produced by speech recognition
    pub is_auto_generated: bool,
}

impl TranscriptTrack {
    pub fn manual(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            name: None,
            is_auto_generated: false,
        }
    }

    pub fn generated(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            name: None,
            is_auto_generated: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_auto_generated {
            "auto-generated"
        } else {
            "manual"
        }
    }
}

/// All tracks available for a video, in source enumeration order.
///
/// Language codes are unique within each partition; later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackList {
    tracks: Vec<TranscriptTrack>,
}

impl TrackList {
    pub fn new(tracks: impl IntoIterator<Item = TranscriptTrack>) -> Self {
        let mut unique: Vec<TranscriptTrack> = Vec::new();
        for track in tracks {
            let duplicate = unique.iter().any(|t| {
                t.is_auto_generated == track.is_auto_generated
                    && t.language_code == track.language_code
            });
            if !duplicate {
                unique.push(track);
            }
        }
        Self { tracks: unique }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Every track in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.tracks.iter()
    }

    pub fn manual(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.tracks.iter().filter(|t| !t.is_auto_generated)
    }

    pub fn generated(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.tracks.iter().filter(|t| t.is_auto_generated)
    }

    pub fn find(&self, language_code: &str, is_auto_generated: bool) -> Option<&TranscriptTrack> {
        self.tracks
            .iter()
            .find(|t| t.is_auto_generated == is_auto_generated && t.language_code == language_code)
    }

    pub fn language_codes(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.language_code.as_str()).collect()
    }
}

/// Entries fetched from a source for one track, not yet normalized
#[derive(Debug, Clone)]
pub struct RawTranscript {
    /// Track the entries came from, if the source reports it
    pub track: Option<TranscriptTrack>,

    pub entries: Vec<RawEntry>,
}

/// Canonical transcript: an ordered, non-empty sequence of segments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    video_id: VideoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    track: Option<TranscriptTrack>,
    segments: Vec<Segment>,
}

impl Transcript {
    /// Returns `None` when `segments` is empty.
    pub fn new(
        video_id: VideoId,
        track: Option<TranscriptTrack>,
        segments: Vec<Segment>,
    ) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            video_id,
            track,
            segments,
        })
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn track(&self) -> Option<&TranscriptTrack> {
        self.track.as_ref()
    }

    pub fn language_code(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.language_code.as_str())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// A constructed transcript always holds at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
