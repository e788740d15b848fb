//! CLI interface for fsakit
//!
//! Provides command-line access to the automaton operations.

pub mod args;
pub mod commands;
pub mod detect;
pub mod paths;

pub use args::{Cli, Commands, FileFormat, OutputArgs};
pub use detect::{detect_format, output_format, FormatDetection};
pub use paths::{config_dir, load_engine_config};
