//! Input/Output handling for the CLI.
//!
//! This module provides:
//! - Loading of JSON ideas files
//! - Unified output formatting (text, JSON)
//! - Consistent error handling and exit codes

pub mod exit_code;
pub mod format;
pub mod ideas_file;

pub use exit_code::ExitCode;
pub use format::{ErrorDetails, JsonResponse, OutputFormat, ResponseMeta};
pub use ideas_file::{IdeaRecord, IdeaSet, ideas_from_records, load_ideas_file};
