//! Coercion of heterogeneous raw entries into canonical segments
//!
//! Sources deliver entries in several shapes. Each shape is handled by a
//! [`SegmentAdapter`]; the [`Normalizer`] offers every entry to its adapters in
//! order and keeps the first answer. Entries no adapter can coerce are skipped.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::transcript::types::{RawEntry, Segment};

/// Keys that may hold caption text, in lookup order
const TEXT_KEYS: &[&str] = &["text", "utf8", "content", "caption"];

/// Keys that may hold a start offset, with the factor converting them to seconds
const START_KEYS: &[(&str, f64)] = &[
    ("start", 1.0),
    ("offset", 1.0),
    ("start_time", 1.0),
    ("startSeconds", 1.0),
    ("startMs", 0.001),
    ("start_ms", 0.001),
];

/// Outcome of offering one entry to one adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    /// The adapter recognized and converted the entry
    Segment(Segment),
    /// The adapter recognized the entry but it holds no usable segment
    Rejected(String),
    /// The adapter recognized the entry but its caption text is blank
    Blank,
    /// The entry is not in a shape this adapter handles
    NotApplicable,
}

pub trait SegmentAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn coerce(&self, entry: &RawEntry) -> Coercion;
}

/// `{"text": "...", "start": 1.5}` records
pub struct FieldRecordAdapter;

impl SegmentAdapter for FieldRecordAdapter {
    fn name(&self) -> &'static str {
        "field-record"
    }

    fn coerce(&self, entry: &RawEntry) -> Coercion {
        let Some(obj) = entry.as_object() else {
            return Coercion::NotApplicable;
        };
        match (
            obj.get("text").and_then(Value::as_str),
            obj.get("start").and_then(Value::as_f64),
        ) {
            (Some(text), Some(start)) => finish(start, text),
            _ => Coercion::NotApplicable,
        }
    }
}

/// Timed-text events: `{"tStartMs": 1500, "segs": [{"utf8": "..."}]}`
pub struct TimedTextEventAdapter;

impl SegmentAdapter for TimedTextEventAdapter {
    fn name(&self) -> &'static str {
        "timed-text-event"
    }

    fn coerce(&self, entry: &RawEntry) -> Coercion {
        let Some(obj) = entry.as_object() else {
            return Coercion::NotApplicable;
        };
        let Some(start_ms) = obj.get("tStartMs") else {
            return Coercion::NotApplicable;
        };
        let Some(start_ms) = number(start_ms) else {
            return Coercion::Rejected(format!("non-numeric tStartMs {}", start_ms));
        };
        // Window and style events carry no `segs`.
        let Some(segs) = obj.get("segs").and_then(Value::as_array) else {
            return Coercion::Blank;
        };

        let text: String = segs
            .iter()
            .filter_map(|seg| seg.get("utf8").and_then(Value::as_str))
            .collect();

        finish(start_ms / 1000.0, &text)
    }
}

/// Best-effort lookup of text-like and start-like fields on any object
pub struct IntrospectingAdapter;

impl SegmentAdapter for IntrospectingAdapter {
    fn name(&self) -> &'static str {
        "introspection"
    }

    fn coerce(&self, entry: &RawEntry) -> Coercion {
        let Some(obj) = entry.as_object() else {
            return Coercion::NotApplicable;
        };

        let text = lookup_text(obj);
        let start = START_KEYS
            .iter()
            .find_map(|(key, factor)| obj.get(*key).map(|value| (value, *factor)));

        if text.is_none() && start.is_none() {
            return Coercion::NotApplicable;
        }

        let start = match start {
            None => 0.0,
            Some((value, factor)) => match number(value) {
                Some(n) => n * factor,
                None => return Coercion::Rejected(format!("non-numeric start {}", value)),
            },
        };
        let text = text.unwrap_or_else(|| entry.to_string());

        finish(start, &text)
    }
}

/// Bare strings become a segment at offset zero
pub struct StringAdapter;

impl SegmentAdapter for StringAdapter {
    fn name(&self) -> &'static str {
        "string"
    }

    fn coerce(&self, entry: &RawEntry) -> Coercion {
        match entry {
            Value::String(text) => finish(0.0, text),
            _ => Coercion::NotApplicable,
        }
    }
}

/// Why an entry was left out of the canonical transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Recognized entry with no caption text, common in auto-generated tracks
    Blank,
    /// Entry that could not be coerced
    Malformed(String),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "blank text"),
            Self::Malformed(reason) => f.write_str(reason),
        }
    }
}

/// Result of normalizing a batch of raw entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub segments: Vec<Segment>,
    pub skipped: usize,
}

/// Ordered adapter chain
pub struct Normalizer {
    adapters: Vec<Box<dyn SegmentAdapter>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(FieldRecordAdapter),
            Box::new(TimedTextEventAdapter),
            Box::new(IntrospectingAdapter),
            Box::new(StringAdapter),
        ])
    }
}

impl Normalizer {
    pub fn new(adapters: Vec<Box<dyn SegmentAdapter>>) -> Self {
        Self { adapters }
    }

    /// Coerce one entry with the first adapter that recognizes it.
    pub fn coerce(&self, entry: &RawEntry) -> Result<Segment, Skip> {
        for adapter in &self.adapters {
            match adapter.coerce(entry) {
                Coercion::NotApplicable => continue,
                Coercion::Segment(segment) => return Ok(segment),
                Coercion::Blank => return Err(Skip::Blank),
                Coercion::Rejected(reason) => {
                    return Err(Skip::Malformed(format!(
                        "{} ({} adapter)",
                        reason,
                        adapter.name()
                    )))
                }
            }
        }
        Err(Skip::Malformed("unrecognized entry shape".to_string()))
    }

    /// Normalize entries in order, skipping the ones that cannot be coerced.
    pub fn normalize(&self, entries: &[RawEntry]) -> Normalized {
        let mut normalized = Normalized::default();

        for (index, entry) in entries.iter().enumerate() {
            match self.coerce(entry) {
                Ok(segment) => normalized.segments.push(segment),
                Err(Skip::Blank) => {
                    debug!("Skipping blank transcript entry {}", index);
                    normalized.skipped += 1;
                }
                Err(reason) => {
                    warn!("Skipping transcript entry {}: {}", index, reason);
                    normalized.skipped += 1;
                }
            }
        }

        if normalized.skipped > 0 {
            debug!(
                "Normalized {} of {} transcript entries",
                normalized.segments.len(),
                entries.len()
            );
        }

        normalized
    }
}

fn lookup_text(obj: &Map<String, Value>) -> Option<String> {
    TEXT_KEYS.iter().find_map(|key| match obj.get(*key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    })
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validate the start offset and collapse line breaks in the text.
fn finish(start: f64, text: &str) -> Coercion {
    if !start.is_finite() || start < 0.0 {
        return Coercion::Rejected(format!("invalid start offset {}", start));
    }

    let text = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return Coercion::Blank;
    }

    Coercion::Segment(Segment::new(start, text))
}
