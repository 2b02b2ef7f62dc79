//! Error handling for skilltest.
//!
//! This module provides:
//! - [`HarnessError`]: The main error enum for all harness operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context
//! - Suggestion helpers for context-aware recovery hints

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for harness operations.
///
/// Manifest, resolution and contract failures are surfaced to the caller
/// exactly as they were raised; nothing in the crate recovers from them.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Missing mandatory key '{key}' in {document}")]
    MissingKey { key: String, document: String },

    #[error("Invalid value for key '{key}' in {document}")]
    InvalidValue { key: String, document: String },

    #[error("Failed to resolve function '{function}' from module '{module}'")]
    Resolution { function: String, module: String },

    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Invalid contract: {0}")]
    ContractInvalid(String),

    #[error("Handler '{function}' in module '{module}' failed: {reason}")]
    HandlerFailed {
        function: String,
        module: String,
        reason: String,
    },

    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub fn missing_key(key: impl Into<String>, document: impl Into<String>) -> Self {
        Self::MissingKey {
            key: key.into(),
            document: document.into(),
        }
    }

    pub fn invalid_value(key: impl Into<String>, document: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            document: document.into(),
        }
    }

    pub fn resolution(function: impl Into<String>, module: impl Into<String>) -> Self {
        Self::Resolution {
            function: function.into(),
            module: module.into(),
        }
    }

    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingKey { .. } => ErrorCode::ManifestMissingKey,
            Self::InvalidValue { .. } => ErrorCode::ManifestInvalidValue,
            Self::ManifestParse(_) => ErrorCode::ManifestParseError,
            Self::ContractViolation(_) => ErrorCode::ContractViolation,
            Self::ContractInvalid(_) => ErrorCode::ContractInvalid,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::Resolution { .. } => ErrorCode::HandlerUnresolved,
            Self::HandlerFailed { .. } => ErrorCode::HandlerFailed,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::MissingKey { key, document } | Self::InvalidValue { key, document } => {
                Some(serde_json::json!({ "key": key, "document": document }))
            }
            Self::Resolution { function, module } => {
                Some(serde_json::json!({ "function": function, "module": module }))
            }
            Self::HandlerFailed {
                function,
                module,
                reason,
            } => Some(serde_json::json!({
                "function": function,
                "module": module,
                "reason": reason,
            })),
            Self::ContractViolation(reason) | Self::ContractInvalid(reason) => {
                Some(serde_json::json!({ "reason": reason }))
            }
            _ => None,
        }
    }

    /// Returns true for the two manifest rule failures.
    #[must_use]
    pub const fn is_manifest_error(&self) -> bool {
        matches!(self, Self::MissingKey { .. } | Self::InvalidValue { .. })
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_harness_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted in robot mode so scripts can branch on the failing rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "MANIFEST_MISSING_KEY")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 101)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether the skill author can fix this without touching the harness
    pub recoverable: bool,

    /// Error category (e.g., "manifest", "contract")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a [`HarnessError`].
    #[must_use]
    pub fn from_harness_error(err: &HarnessError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&HarnessError> for StructuredError {
    fn from(err: &HarnessError) -> Self {
        Self::from_harness_error(err)
    }
}

/// Result type alias using [`HarnessError`].
pub type Result<T> = std::result::Result<T, HarnessError>;
