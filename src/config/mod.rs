//! Configuration module for tubenotes
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{LlmSettings, ServerSettings, Settings, SourceSettings};
