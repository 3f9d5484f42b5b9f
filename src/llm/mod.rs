//! LLM module for tubenotes
//!
//! Builds the key-point prompt and drives the text-generation service.

mod client;
mod gemini;
mod prompts;
mod summarizer;

pub use client::{build_generator, init_generator, GeneratorInitError, TextGenerator};
pub use gemini::GeminiClient;
pub use prompts::{build_key_points_prompt, format_time, format_transcript};
pub use summarizer::{SummaryError, Summarizer};
