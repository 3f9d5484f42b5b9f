//! HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::pipeline::VideoSummary;
use crate::server::AppContext;
use crate::transcript::VideoId;
use crate::{ErrorKind, TubenotesError};

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    summary: String,
    debug_info: DebugInfo,
}

#[derive(Debug, Serialize)]
pub struct DebugInfo {
    request_id: Uuid,
    timestamp: String,
    video_id: VideoId,
    language: Option<String>,
    segment_count: usize,
    summary_length: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
}

/// Error reply with a status code and a JSON body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error: message.to_string(),
                kind: None,
            },
        }
    }
}

impl From<TubenotesError> for ApiError {
    fn from(err: TubenotesError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            body: ErrorResponse {
                error: err.to_string(),
                kind: Some(err.kind()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// GET / - Liveness check
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        message: "Server is running",
    })
}

/// POST /summarize - Summarize the video named by `videoId`
pub async fn summarize(
    State(ctx): State<AppContext>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("summarize", %request_id);

    async move {
        let Json(request) = payload.map_err(|e| {
            error!("No JSON data could be parsed from request: {}", e);
            ApiError::bad_request("No data provided")
        })?;

        let Some(video_id) = request.video_id else {
            error!("No videoId found in request JSON");
            return Err(ApiError::bad_request("No video ID provided"));
        };

        info!("Request received for video {}", video_id.trim());
        let summary = ctx.pipeline.summarize(&video_id).await.map_err(|e| {
            error!("Summarization failed ({}): {}", e.kind(), e);
            ApiError::from(e)
        })?;

        Ok(Json(response_for(request_id, summary)))
    }
    .instrument(span)
    .await
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        body: ErrorResponse {
            error: "Endpoint not found".to_string(),
            kind: None,
        },
    }
}

fn response_for(request_id: Uuid, summary: VideoSummary) -> SummarizeResponse {
    SummarizeResponse {
        debug_info: DebugInfo {
            request_id,
            timestamp: Utc::now().to_rfc3339(),
            video_id: summary.video_id,
            language: summary.language_code,
            segment_count: summary.segment_count,
            summary_length: summary.summary.len(),
        },
        summary: summary.summary,
    }
}
