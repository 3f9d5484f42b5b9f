//! YouTube caption source
//!
//! Tracks are discovered through the innertube player endpoint; a track's
//! captions are downloaded from its timed-text URL in the `json3` format, whose
//! `events` array is handed to the normalizer untouched.
//!
//! Player responses are kept for a short while so that one resolution (default
//! fetch, listing, then candidate fetches) costs a single player request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::transcript::identifier::VideoId;
use crate::transcript::source::{SourceError, TranscriptSource};
use crate::transcript::types::{RawEntry, RawTranscript, TrackList, TranscriptTrack};

const DEFAULT_YOUTUBE_ENDPOINT: &str = "https://www.youtube.com";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// Language used when no explicit track is requested
const DEFAULT_LANGUAGE: &str = "en";

/// How long a player response's caption tracks are reused
const CAPTION_CACHE_TTL: Duration = Duration::from_secs(60);

type CaptionTracks = Arc<Vec<CaptionTrack>>;

/// Recently fetched caption tracks, keyed by video ID
struct CaptionCache {
    ttl: Duration,
    entries: HashMap<String, (Instant, CaptionTracks)>,
}

impl CaptionCache {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    fn get(&self, video: &str, now: Instant) -> Option<CaptionTracks> {
        self.entries
            .get(video)
            .filter(|(stored, _)| now.duration_since(*stored) < self.ttl)
            .map(|(_, tracks)| Arc::clone(tracks))
    }

    fn insert(&mut self, video: &str, tracks: CaptionTracks, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (stored, _)| now.duration_since(*stored) < ttl);
        self.entries.insert(video.to_string(), (now, tracks));
    }
}

pub struct YouTubeSource {
    http: Client,
    endpoint: String,
    cache: Mutex<CaptionCache>,
}

impl YouTubeSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let endpoint = if settings.source.endpoint.trim().is_empty() {
            DEFAULT_YOUTUBE_ENDPOINT.to_string()
        } else {
            settings
                .source
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        let mut builder =
            Client::builder().timeout(Duration::from_secs(settings.source.timeout_secs.max(1)));
        if !settings.source.user_agent.trim().is_empty() {
            builder = builder.user_agent(settings.source.user_agent.trim());
        }

        Ok(Self {
            http: builder
                .build()
                .context("Failed to build transcript HTTP client")?,
            endpoint,
            cache: Mutex::new(CaptionCache::new(CAPTION_CACHE_TTL)),
        })
    }

    fn player_url(&self) -> String {
        format!("{}/youtubei/v1/player?prettyPrint=false", self.endpoint)
    }

    async fn caption_tracks(&self, video: &VideoId) -> Result<CaptionTracks, SourceError> {
        if let Some(tracks) = self.cached(video) {
            debug!("Reusing caption tracks for video {}", video);
            return Ok(tracks);
        }

        let tracks = Arc::new(self.request_caption_tracks(video).await?);
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(video.as_str(), Arc::clone(&tracks), Instant::now());
        Ok(tracks)
    }

    fn cached(&self, video: &VideoId) -> Option<CaptionTracks> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(video.as_str(), Instant::now())
    }

    async fn request_caption_tracks(
        &self,
        video: &VideoId,
    ) -> Result<Vec<CaptionTrack>, SourceError> {
        let body = PlayerRequest {
            context: InnertubeContext {
                client: InnertubeClient {
                    client_name: INNERTUBE_CLIENT_NAME,
                    client_version: INNERTUBE_CLIENT_VERSION,
                },
            },
            video_id: video.as_str(),
        };

        let response = self.http.post(self.player_url()).json(&body).send().await?;
        let response = check_status(response)?;
        let player: PlayerResponse = response.json().await?;

        captions_from_player(video, player)
    }

    async fn download(&self, track: &CaptionTrack) -> Result<Vec<RawEntry>, SourceError> {
        let url = timed_text_url(&track.base_url)?;
        debug!("Downloading {} captions", track.language_code);

        let response = self.http.get(url).send().await?;
        let response = check_status(response)?;
        let payload: TimedTextResponse = response.json().await?;

        Ok(payload.events)
    }
}

#[async_trait]
impl TranscriptSource for YouTubeSource {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn list_tracks(&self, video: &VideoId) -> Result<TrackList, SourceError> {
        let tracks = self.caption_tracks(video).await?;
        Ok(TrackList::new(tracks.iter().map(CaptionTrack::to_track)))
    }

    async fn fetch(
        &self,
        video: &VideoId,
        track: Option<&TranscriptTrack>,
    ) -> Result<RawTranscript, SourceError> {
        let available = self.caption_tracks(video).await?;

        let Some(chosen) = choose_track(&available, track) else {
            return Err(SourceError::TrackNotFound {
                video: video.to_string(),
                language: track
                    .map(|t| t.language_code.clone())
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                kind: track.map(TranscriptTrack::kind_label).unwrap_or("default"),
            });
        };

        Ok(RawTranscript {
            track: Some(chosen.to_track()),
            entries: self.download(chosen).await?,
        })
    }
}

/// The listed track matching `wanted` by language and kind. Without a
/// request, manual English wins over auto-generated English.
fn choose_track<'a>(
    available: &'a [CaptionTrack],
    wanted: Option<&TranscriptTrack>,
) -> Option<&'a CaptionTrack> {
    match wanted {
        Some(wanted) => available.iter().find(|t| {
            t.language_code == wanted.language_code
                && t.is_auto_generated() == wanted.is_auto_generated
        }),
        None => [false, true].into_iter().find_map(|generated| {
            available.iter().find(|t| {
                t.language_code == DEFAULT_LANGUAGE && t.is_auto_generated() == generated
            })
        }),
    }
}

fn status_error(status: StatusCode) -> Option<SourceError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(SourceError::Transport(
            "rate limited by YouTube (HTTP 429)".to_string(),
        ));
    }
    if !status.is_success() {
        return Some(SourceError::Transport(format!("HTTP {}", status)));
    }
    None
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    match status_error(response.status()) {
        Some(err) => Err(err),
        None => Ok(response),
    }
}

fn captions_from_player(
    video: &VideoId,
    player: PlayerResponse,
) -> Result<Vec<CaptionTrack>, SourceError> {
    if let Some(playability) = player.playability_status {
        if playability.status != "OK" {
            return Err(SourceError::VideoUnavailable {
                video: video.to_string(),
                reason: playability.reason.unwrap_or(playability.status),
            });
        }
    }

    let tracks = player
        .captions
        .and_then(|c| c.tracklist)
        .map(|t| t.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(SourceError::TranscriptsDisabled(video.to_string()));
    }

    Ok(tracks)
}

/// Timed-text URL for a caption track, forced to the `json3` format.
fn timed_text_url(base_url: &str) -> Result<Url, SourceError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| SourceError::InvalidResponse(format!("bad caption URL: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Ok(url)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRequest<'a> {
    context: InnertubeContext,
    video_id: &'a str,
}

#[derive(Debug, Serialize)]
struct InnertubeContext {
    client: InnertubeClient,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InnertubeClient {
    client_name: &'static str,
    client_version: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<TrackName>,
}

impl CaptionTrack {
    fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn to_track(&self) -> TranscriptTrack {
        TranscriptTrack {
            language_code: self.language_code.clone(),
            name: self.name.as_ref().and_then(TrackName::text),
            is_auto_generated: self.is_auto_generated(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

impl TrackName {
    fn text(&self) -> Option<String> {
        if let Some(text) = &self.simple_text {
            return Some(text.clone());
        }
        let joined: String = self.runs.iter().map(|r| r.text.as_str()).collect();
        (!joined.is_empty()).then_some(joined)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TextRun {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<RawEntry>,
}
