//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success
//! - `1`: General error - unspecified failure
//! - `3`: Command ran but produced no results (e.g. no neighbours found)
//! - `5-7`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::IdeaMapError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Command executed but found nothing (code 3)
    NoResults = 3,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Input broke a contract: bad k, mismatched lengths or dimensions (code 7)
    ContractViolation = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

impl ExitCode {
    /// `Success` when a lookup produced anything, `NoResults` otherwise.
    pub fn from_result_count(count: usize) -> Self {
        if count == 0 {
            ExitCode::NoResults
        } else {
            ExitCode::Success
        }
    }

    /// Convert an `IdeaMapError` to the appropriate exit code.
    pub fn from_error(error: &IdeaMapError) -> Self {
        if error.is_contract_violation() {
            return ExitCode::ContractViolation;
        }

        match error {
            IdeaMapError::FileRead { .. } | IdeaMapError::FileWrite { .. } => ExitCode::IoError,
            IdeaMapError::Vector(crate::vector::VectorError::Storage(_)) => ExitCode::IoError,
            IdeaMapError::ConfigError { .. } => ExitCode::ConfigError,
            _ => ExitCode::GeneralError,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Stable code for the JSON envelope's `code` field.
    pub fn status_code(&self) -> &'static str {
        match self {
            ExitCode::Success => "OK",
            ExitCode::GeneralError => "GENERAL_ERROR",
            ExitCode::NoResults => "NO_RESULTS",
            ExitCode::IoError => "IO_ERROR",
            ExitCode::ConfigError => "CONFIG_ERROR",
            ExitCode::ContractViolation => "CONTRACT_VIOLATION",
        }
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NoResults => "No results",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::ContractViolation => "Invalid input",
        }
    }
}
