//! Configuration validation system.

use super::types::PropagationConfig;
use crate::tracecontext::{validate_key, validate_value, ParentId};

/// A single validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// Error message.
    pub message: String,
    /// Severity level.
    pub severity: ValidationSeverity,
}

impl ValidationError {
    /// Create a new error.
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    /// Create a new warning.
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }
}

/// Severity of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Error - configuration is invalid.
    Error,
    /// Warning - configuration may have issues.
    Warning,
}

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if the validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| e.severity == ValidationSeverity::Error)
    }

    /// Get all validation errors.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get only warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Warning)
            .collect()
    }

    /// Merge another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}

/// Trait for configuration validators.
pub trait Validator: std::fmt::Debug + Send + Sync {
    /// Validate a configuration and return any errors.
    fn validate(&self, config: &PropagationConfig) -> ValidationResult;
}

/// Built-in validator that checks values against the header grammars.
#[derive(Debug, Default)]
pub struct BasicValidator;

impl BasicValidator {
    /// Create a new basic validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for BasicValidator {
    fn validate(&self, config: &PropagationConfig) -> ValidationResult {
        let mut result = ValidationResult::new();
        let tc = &config.tracecontext;

        if let Some(key) = &tc.vendor_key {
            if let Err(e) = validate_key(key) {
                result.add_error(ValidationError::error(
                    "tracecontext.vendor_key",
                    e.to_string(),
                ));
            }
        } else if !tc.vendor_value.is_empty() {
            result.add_error(ValidationError::warning(
                "tracecontext.vendor_value",
                "vendor_value is ignored without vendor_key",
            ));
        }

        if !tc.vendor_value.is_empty() {
            if let Err(e) = validate_value(&tc.vendor_value) {
                result.add_error(ValidationError::error(
                    "tracecontext.vendor_value",
                    e.to_string(),
                ));
            }
        }

        if !tc.parent_id.is_empty() {
            if let Err(e) = ParentId::parse(&tc.parent_id) {
                result.add_error(ValidationError::error(
                    "tracecontext.parent_id",
                    e.to_string(),
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraceContextConfig;

    fn config(tracecontext: TraceContextConfig) -> PropagationConfig {
        PropagationConfig { tracecontext }
    }

    #[test]
    fn test_basic_validator_valid() {
        let validator = BasicValidator::new();
        assert!(validator.validate(&PropagationConfig::default()).is_valid());

        let result = validator.validate(&config(
            TraceContextConfig::default()
                .with_vendor("r0n@tenant", "edge 1")
                .with_parent_id("00f067aa0ba902b7"),
        ));
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_basic_validator_bad_key() {
        let result = BasicValidator::new()
            .validate(&config(TraceContextConfig::default().with_vendor("R0N", "")));

        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].field, "tracecontext.vendor_key");
        assert!(result.errors()[0].message.contains("invalid tracestate key"));
    }

    #[test]
    fn test_basic_validator_bad_value() {
        let result = BasicValidator::new()
            .validate(&config(TraceContextConfig::default().with_vendor("r0n", "a,b")));

        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].field, "tracecontext.vendor_value");
    }

    #[test]
    fn test_basic_validator_bad_parent_id() {
        let result = BasicValidator::new().validate(&config(
            TraceContextConfig::default().with_parent_id("0000000000000000"),
        ));

        assert!(!result.is_valid());
        assert!(result.errors()[0].message.contains("all-zero"));
    }

    #[test]
    fn test_value_without_key_is_warning() {
        let mut tc = TraceContextConfig::default();
        tc.vendor_value = "orphan".to_string();

        let result = BasicValidator::new().validate(&config(tc));
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_validation_result_merge() {
        let mut result1 = ValidationResult::new();
        result1.add_error(ValidationError::error("field1", "error1"));

        let mut result2 = ValidationResult::new();
        result2.add_error(ValidationError::warning("field2", "warning1"));

        result1.merge(result2);
        assert_eq!(result1.errors().len(), 2);
        assert!(!result1.is_valid());
    }
}
