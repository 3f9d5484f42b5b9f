//! Transcript module for tubenotes
//!
//! Turns a video identifier into a canonical, timestamped transcript.

mod identifier;
mod normalize;
mod resolver;
mod source;
mod types;
mod youtube;

pub use identifier::{IdentifierError, VideoId};
pub use normalize::{
    Coercion, FieldRecordAdapter, IntrospectingAdapter, Normalized, Normalizer, SegmentAdapter,
    Skip, StringAdapter, TimedTextEventAdapter,
};
pub use resolver::{
    plan_candidates, Candidate, Tier, TranscriptError, TranscriptResolver, ENGLISH_VARIANTS,
};
pub use source::{SourceError, TranscriptSource};
pub use types::{RawEntry, RawTranscript, Segment, TrackList, Transcript, TranscriptTrack};
pub use youtube::YouTubeSource;
