//! Configuration file loader.

use super::error::{ConfigError, ConfigResult};
use super::types::PropagationConfig;
use super::validation::{ValidationResult, ValidationSeverity, Validator};
use std::path::Path;
use tracing::warn;

/// Configuration loader with validation support.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Validators to run on loaded configuration.
    validators: Vec<Box<dyn Validator>>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator to the loader.
    #[must_use]
    pub fn with_validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ConfigResult<PropagationConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.load_str(&content)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML is malformed
    /// - Validation fails
    pub fn load_str(&self, content: &str) -> ConfigResult<PropagationConfig> {
        let config: PropagationConfig = toml::from_str(content)?;
        self.validate(&config)?;
        Ok(config)
    }

    /// Run all registered validators; warnings are logged, errors fail.
    fn validate(&self, config: &PropagationConfig) -> ConfigResult<()> {
        let mut result = ValidationResult::new();
        for validator in &self.validators {
            result.merge(validator.validate(config));
        }

        for warning in result.warnings() {
            warn!(field = %warning.field, "{}", warning.message);
        }

        if !result.is_valid() {
            let errors: Vec<String> = result
                .errors()
                .iter()
                .filter(|e| e.severity == ValidationSeverity::Error)
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            return Err(ConfigError::ValidationError(errors.join("; ")));
        }
        Ok(())
    }

    /// Load configuration or return default if file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(&self, path: P) -> ConfigResult<PropagationConfig> {
        let path = path.as_ref();
        if path.exists() {
            self.load(path)
        } else {
            Ok(PropagationConfig::default())
        }
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save<P: AsRef<Path>>(&self, config: &PropagationConfig, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(config)?;
        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BasicValidator, TraceContextConfig, ValidationError};
    use crate::tracecontext::SamplingBehavior;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_string() {
        let loader = ConfigLoader::new();
        let config = loader
            .load_str(
                r#"
            [tracecontext]
            vendor_key = "r0n"
            sampling = "never_sampled"
        "#,
            )
            .unwrap();
        assert_eq!(config.tracecontext.vendor_key.as_deref(), Some("r0n"));
        assert_eq!(config.tracecontext.sampling, SamplingBehavior::NeverSampled);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
            [tracecontext]
            vendor_key = "file-test"
        "#,
        )
        .unwrap();

        let loader = ConfigLoader::new().with_validator(BasicValidator::new());
        let config = loader.load(&config_path).unwrap();
        assert_eq!(config.tracecontext.vendor_key.as_deref(), Some("file-test"));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let loader = ConfigLoader::new().with_validator(BasicValidator::new());
        let result = loader.load_str(
            r#"
            [tracecontext]
            vendor_key = "Bad Key"
        "#,
        );

        match result {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("tracecontext.vendor_key"));
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[derive(Debug)]
    struct ForbidNeverSampled;

    impl Validator for ForbidNeverSampled {
        fn validate(&self, config: &PropagationConfig) -> ValidationResult {
            let mut result = ValidationResult::new();
            if config.tracecontext.sampling == SamplingBehavior::NeverSampled {
                result.add_error(ValidationError::error(
                    "tracecontext.sampling",
                    "never_sampled is not allowed here",
                ));
            }
            result
        }
    }

    #[test]
    fn test_load_reports_errors_from_every_validator() {
        let loader = ConfigLoader::new()
            .with_validator(BasicValidator::new())
            .with_validator(ForbidNeverSampled);
        let result = loader.load_str(
            r#"
            [tracecontext]
            vendor_key = "Bad Key"
            sampling = "never_sampled"
        "#,
        );

        match result {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("tracecontext.vendor_key"));
                assert!(msg.contains("tracecontext.sampling"));
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_warning_does_not_fail_or_leak_into_errors() {
        let loader = ConfigLoader::new()
            .with_validator(BasicValidator::new())
            .with_validator(ForbidNeverSampled);
        let result = loader.load_str(
            r#"
            [tracecontext]
            vendor_value = "orphan"
            sampling = "never_sampled"
        "#,
        );

        match result {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("tracecontext.sampling"));
                assert!(!msg.contains("tracecontext.vendor_value"));
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_malformed_toml() {
        let loader = ConfigLoader::new();
        let result = loader.load_str("[tracecontext");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let loader = ConfigLoader::new();
        let result = loader.load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new();
        let config = loader.load_or_default("/nonexistent/path").unwrap();
        assert_eq!(config, PropagationConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("saved.toml");

        let config = PropagationConfig {
            tracecontext: TraceContextConfig::default()
                .with_vendor("saved", "")
                .with_sampling(SamplingBehavior::AlwaysSampled),
        };

        let loader = ConfigLoader::new().with_validator(BasicValidator::new());
        loader.save(&config, &config_path).unwrap();

        let loaded = loader.load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }
}
