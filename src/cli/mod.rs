//! Command-line interface for tubenotes
//!
//! Argument parsing lives in `args`, command bodies in `commands`.

pub mod args;
pub mod commands;
pub mod completions;

pub use args::{Cli, Commands, ConfigCommand};
