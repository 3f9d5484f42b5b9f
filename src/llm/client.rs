use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;

/// Failure to construct or validate a text generator at startup
#[derive(Error, Debug)]
pub enum GeneratorInitError {
    #[error("Unsupported llm.provider '{0}'. Supported providers: gemini")]
    UnsupportedProvider(String),

    #[error(
        "Gemini API key is missing. Set llm.api_key in config, TUBENOTES_GEMINI_API_KEY or GEMINI_API_KEY."
    )]
    MissingApiKey,

    #[error("Failed to build {provider} client: {reason}")]
    Client { provider: String, reason: String },

    #[error("{provider} verification failed: {reason}")]
    Verification { provider: String, reason: String },
}

/// External text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`. One attempt, no retries.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Lightweight live check that credentials and model are usable.
    async fn verify(&self) -> Result<()> {
        Ok(())
    }
}

/// Build a text generator from runtime settings.
pub fn build_generator(settings: &Settings) -> Result<Box<dyn TextGenerator>, GeneratorInitError> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => Ok(Box::new(GeminiClient::from_settings(settings)?)),
        other => Err(GeneratorInitError::UnsupportedProvider(other.to_string())),
    }
}

/// Build a generator and, when `verify` is set, prove it works with a live call.
pub async fn init_generator(
    settings: &Settings,
    verify: bool,
) -> Result<Box<dyn TextGenerator>, GeneratorInitError> {
    let generator = build_generator(settings)?;

    if verify {
        generator
            .verify()
            .await
            .map_err(|e| GeneratorInitError::Verification {
                provider: generator.name().to_string(),
                reason: format!("{:#}", e),
            })?;
        tracing::info!("{} generator verified", generator.name());
    }

    Ok(generator)
}
