//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Manifest errors
//! - 2xx: Contract errors
//! - 3xx: Config errors
//! - 4xx: Handler errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `ManifestMissingKey` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Manifest errors (1xx)
    // ========================================
    /// E101: A mandatory manifest key is absent
    ManifestMissingKey,
    /// E102: A manifest key is present but its value is rejected
    ManifestInvalidValue,
    /// E103: The manifest file is not a valid YAML document
    ManifestParseError,

    // ========================================
    // Contract errors (2xx)
    // ========================================
    /// E201: A payload or response does not conform to the contract
    ContractViolation,
    /// E202: The contract document itself is malformed
    ContractInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,

    // ========================================
    // Handler errors (4xx)
    // ========================================
    /// E401: Handler module or function could not be resolved
    HandlerUnresolved,
    /// E402: Handler ran and reported a failure
    HandlerFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E905: Serialization/deserialization of harness data failed
    SerializationError,
    /// E906: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `ManifestMissingKey` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ManifestMissingKey => 101,
            Self::ManifestInvalidValue => 102,
            Self::ManifestParseError => 103,

            Self::ContractViolation => 201,
            Self::ContractInvalid => 202,

            Self::ConfigInvalid => 302,

            Self::HandlerUnresolved => 401,
            Self::HandlerFailed => 402,

            Self::SerializationError => 905,
            Self::IoError => 906,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ManifestMissingKey => "Add the missing key to skill.yml. Run `skilltest validate` after each fix",
            Self::ManifestInvalidValue => "Fix the value of the reported key in skill.yml. Run `skilltest validate` after each fix",
            Self::ManifestParseError => "skill.yml must be a YAML mapping at the top level",
            Self::ContractViolation => "The data does not match the contract namespace. Compare field names and types with the contract file",
            Self::ContractInvalid => "Check the contract file: every namespace needs `fields`, every field a `name` and a `type`",
            Self::ConfigInvalid => "Check skilltest.toml syntax or the SKILLTEST_* environment variables",
            Self::HandlerUnresolved => "Check `handler.file` and `handler.function` in skill.yml, or pass --handler-path",
            Self::HandlerFailed => "The handler reported an error. Run with -v to see its stderr",
            Self::SerializationError => "Payloads must be valid JSON",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the skill author.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::ManifestMissingKey
            | Self::ManifestInvalidValue
            | Self::ManifestParseError
            | Self::ContractViolation
            | Self::ContractInvalid
            | Self::ConfigInvalid
            | Self::HandlerUnresolved
            | Self::HandlerFailed
            | Self::IoError => true,

            Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "manifest",
            2 => "contract",
            3 => "config",
            4 => "handler",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::ManifestMissingKey,
            Self::ManifestInvalidValue,
            Self::ManifestParseError,
            Self::ContractViolation,
            Self::ContractInvalid,
            Self::ConfigInvalid,
            Self::HandlerUnresolved,
            Self::HandlerFailed,
            Self::SerializationError,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_numeric() {
        assert_eq!(ErrorCode::ManifestMissingKey.numeric(), 101);
        assert_eq!(ErrorCode::ContractViolation.numeric(), 201);
        assert_eq!(ErrorCode::ConfigInvalid.numeric(), 302);
        assert_eq!(ErrorCode::HandlerUnresolved.numeric(), 401);
        assert_eq!(ErrorCode::IoError.numeric(), 906);
    }

    #[test]
    fn test_error_code_string() {
        assert_eq!(ErrorCode::ManifestMissingKey.code_string(), "E101");
        assert_eq!(ErrorCode::HandlerFailed.code_string(), "E402");
    }

    #[test]
    fn test_all_codes_have_suggestions_and_categories() {
        for code in ErrorCode::all() {
            assert!(!code.suggestion().is_empty(), "{code:?} has no suggestion");
            assert_ne!(code.category(), "unknown", "{code:?} has no category");
        }
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::ManifestInvalidValue).unwrap();
        assert_eq!(json, "\"MANIFEST_INVALID_VALUE\"");

        let deserialized: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, ErrorCode::ManifestInvalidValue);
    }

    #[test]
    fn test_no_duplicate_numeric_codes() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::all() {
            assert!(seen.insert(code.numeric()), "duplicate code {}", code.numeric());
        }
    }
}
