//! Video identifier extraction from raw IDs and YouTube URLs

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Hosts that carry the ID as the first path segment (`youtu.be/<id>`).
const SHORT_LINK_HOSTS: &[&str] = &["youtu.be", "www.youtu.be"];

/// Hosts that carry the ID in `?v=` or an `/embed/<id>` segment.
const CANONICAL_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("No video ID provided")]
    Empty,

    #[error("Invalid video identifier '{0}'")]
    Invalid(String),
}

/// Bare video token accepted by the transcript source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Parse a raw ID or a YouTube URL into a bare token.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(IdentifierError::Empty);
        }

        let token = if looks_like_url(input) {
            from_url(input)
        } else {
            Some(strip_raw(input))
        };

        match token {
            Some(token) if is_valid_token(token.as_str()) => Ok(Self(token)),
            _ => Err(IdentifierError::Invalid(input.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VideoId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn looks_like_url(input: &str) -> bool {
    if input.contains("://") {
        return true;
    }
    let lower = input.to_ascii_lowercase();
    SHORT_LINK_HOSTS
        .iter()
        .chain(CANONICAL_HOSTS)
        .any(|host| lower.starts_with(&format!("{}/", host)))
}

fn from_url(input: &str) -> Option<String> {
    let url = if input.contains("://") {
        Url::parse(input).ok()?
    } else {
        Url::parse(&format!("https://{}", input)).ok()?
    };

    let host = url.host_str()?.to_ascii_lowercase();

    if SHORT_LINK_HOSTS.contains(&host.as_str()) {
        return url
            .path_segments()?
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    if CANONICAL_HOSTS.contains(&host.as_str()) {
        if url.path() == "/watch" {
            return url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned());
        }

        let mut segments = url.path_segments()?;
        if segments.next() == Some("embed") {
            return segments.next().map(str::to_string);
        }
    }

    None
}

/// Drop trailing query fragments and path prefixes from a raw token.
fn strip_raw(input: &str) -> String {
    let token = input.split('?').next().unwrap_or_default();
    let token = token.split('&').next().unwrap_or_default();
    let token = token.rsplit('/').next().unwrap_or_default();
    token.trim().to_string()
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
