use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::llm::client::{GeneratorInitError, TextGenerator};

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, GeneratorInitError> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(GeneratorInitError::MissingApiKey);
        }

        let model = if settings.llm.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL.to_string()
        } else {
            settings.llm.model.trim().to_string()
        };

        let endpoint = if settings.llm.endpoint.trim().is_empty() {
            DEFAULT_GEMINI_ENDPOINT.to_string()
        } else {
            settings
                .llm
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(
                settings.llm.timeout_secs.max(1),
            ))
            .build()
            .map_err(|e| GeneratorInitError::Client {
                provider: "gemini".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_key,
            model,
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GeminiGenerateContentRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(self.request_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Gemini request failed")?;

        let response = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("Gemini returned an error status")?;

        let payload: GeminiGenerateContentResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Gemini response")?;

        extract_text(payload)
    }

    async fn verify(&self) -> Result<()> {
        let response = self
            .http
            .get(self.model_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Gemini model lookup failed")?;

        let model: GeminiModelInfo = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Gemini rejected model '{}'", self.model))?
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Gemini model info")?;

        tracing::debug!("Gemini model available: {}", model.name);
        Ok(())
    }
}

/// Text of the first candidate, parts concatenated. May be blank.
fn extract_text(payload: GeminiGenerateContentResponse) -> Result<String> {
    let Some(candidate) = payload.candidates.into_iter().next() else {
        match payload.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => anyhow::bail!("Gemini blocked the prompt: {}", reason),
            None => anyhow::bail!("Gemini response did not contain any candidates"),
        }
    };

    Ok(candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect())
}

#[derive(Debug, Serialize)]
struct GeminiGenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiModelInfo {
    name: String,
}
