//! # Error Types
//!
//! Structured error types for eurocode_core. Two families matter to callers:
//!
//! - **Validation failures** ([`CalcError::Validation`]) are user-facing and
//!   non-fatal. The operation that raised one left all state untouched, so the
//!   boundary (UI, CLI) shows the message and carries on.
//! - **Contract violations** (everything else) mean the engine was handed data
//!   it must never see: an unknown usage category, a variable load missing its
//!   coefficients, a non-finite number. They propagate to the caller and must
//!   not be swallowed, since a silent default would produce wrong combinations.
//!
//! ## Example
//!
//! ```rust
//! use eurocode_core::errors::{CalcError, CalcResult};
//!
//! fn validate_value(value: f64) -> CalcResult<()> {
//!     if !value.is_finite() {
//!         return Err(CalcError::invalid_input(
//!             "value",
//!             value.to_string(),
//!             "Load value must be a finite number",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_value(f64::NAN).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for eurocode_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Validation rule names carried by [`CalcError::Validation`].
pub mod rules {
    /// The registry must always hold at least one load.
    pub const LAST_LOAD: &str = "last_load";
    /// Generation needs at least one variable load.
    pub const NO_VARIABLE_LOADS: &str = "no_variable_loads";
    /// A load table must not be empty.
    pub const EMPTY_TABLE: &str = "empty_table";
}

/// Structured error type for load registry and combination operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A user action was refused; prior state is unchanged
    #[error("{message}")]
    Validation { rule: String, message: String },

    /// An input value is invalid (non-finite, wrong kind of load, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Usage category key not present in the coefficient table
    #[error("Unknown usage category: '{key}'")]
    UnknownUsageCategory { key: String },

    /// No load with this id in the registry
    #[error("Load not found: {id}")]
    LoadNotFound { id: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Settings could not be applied
    #[error("Configuration error: {setting} - {reason}")]
    ConfigError { setting: String, reason: String },
}

impl CalcError {
    /// Create a Validation error
    pub fn validation(rule: impl Into<String>, message: impl Into<String>) -> Self {
        CalcError::Validation {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnknownUsageCategory error
    pub fn unknown_usage_category(key: impl Into<String>) -> Self {
        CalcError::UnknownUsageCategory { key: key.into() }
    }

    /// Create a LoadNotFound error
    pub fn load_not_found(id: impl ToString) -> Self {
        CalcError::LoadNotFound { id: id.to_string() }
    }

    /// Create a ConfigError
    pub fn config(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            setting: setting.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should be shown to the user as a recoverable message
    /// rather than treated as an internal failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, CalcError::Validation { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Validation { .. } => "VALIDATION_FAILED",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownUsageCategory { .. } => "UNKNOWN_USAGE_CATEGORY",
            CalcError::LoadNotFound { .. } => "LOAD_NOT_FOUND",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}
