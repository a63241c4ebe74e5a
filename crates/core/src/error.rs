//! Structured error handling with context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//!
//! An incomplete signing configuration is deliberately not represented
//! here: the resolver degrades to debug signing instead of failing.

use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // General errors (1xxx)
    InvalidArgument = 1002,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    DirectoryNotFound = 2004,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    InvalidConfigValue = 3004,

    // Process errors (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,

    // Signing errors (7xxx)
    SigningError = 7000,
    InvalidKeystorePassword = 7001,
    AliasNotFound = 7002,
    InvalidKeystoreFormat = 7003,
    IncompleteIdentity = 7004,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            5 => "Process",
            7 => "Signing",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors

    #[allow(missing_docs)]
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    #[allow(missing_docs)]
    pub fn directory_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::DirectoryNotFound,
            format!("Directory not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Pass --project-dir pointing at the Android project root")
    }

    #[allow(missing_docs)]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    #[allow(missing_docs)]
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .signkit.toml file or use --config to specify a path")
    }

    #[allow(missing_docs)]
    pub fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfigValue,
            format!("Invalid value for {field}: {}", message.into()),
        )
    }

    #[allow(missing_docs)]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    #[allow(missing_docs)]
    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    #[allow(missing_docs)]
    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(ErrorCode::CommandNotFound, format!("Command not found: {cmd}"))
            .with_suggestion(format!("Install {cmd} and ensure it's in your PATH"))
    }

    #[allow(missing_docs)]
    pub fn signing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningError, message)
    }

    #[allow(missing_docs)]
    pub fn incomplete_identity(missing: &[&str]) -> Self {
        Self::new(
            ErrorCode::IncompleteIdentity,
            format!("Release signing identity is incomplete (missing: {})", missing.join(", ")),
        )
        .with_suggestion("Export the SIGNING_* variables or add them to gradle.properties")
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const SIGNING_INCOMPLETE: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error, if any
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::SigningError.to_string(), "E7000");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::InvalidConfigValue.category(), "Configuration");
        assert_eq!(ErrorCode::AliasNotFound.category(), "Signing");
        assert_eq!(ErrorCode::CommandNotFound.category(), "Process");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::file_not_found("/path/to/file").with_context("While loading configuration");

        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
        assert!(err.to_string().contains("Context: While loading configuration"));
    }

    #[test]
    fn test_incomplete_identity_lists_keys() {
        let err = Error::incomplete_identity(&["SIGNING_KEY_ALIAS", "SIGNING_STORE_PATH"]);
        assert_eq!(err.code, ErrorCode::IncompleteIdentity);
        assert!(err.message.contains("SIGNING_KEY_ALIAS, SIGNING_STORE_PATH"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.source.is_some());
    }
}
