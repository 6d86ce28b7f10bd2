//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - API keys are non-empty and unique
//! - Enabled provider entries point at parseable server URLs
//! - Parameter ranges are well-formed (min <= max)
//!
//! # Design Decisions
//! - Returns all findings, not just first
//! - Validation is pure function: GatewayConfig → Vec<ValidationError>
//! - Findings are warnings; the document is still accepted
//! - Duplicate API keys resolve last-wins when the snapshot is built

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{GatewayConfig, Range};

/// A single semantic problem in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a decoded configuration and return every finding.
pub fn validate_config(config: &GatewayConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_keys = HashSet::new();
    for (i, record) in config.api_keys.iter().enumerate() {
        if record.api_key.is_empty() {
            errors.push(ValidationError::new(format!("api_keys[{i}].api_key"), "must not be empty"));
        } else if !seen_keys.insert(record.api_key.as_str()) {
            errors.push(ValidationError::new(
                format!("api_keys[{i}].api_key"),
                "duplicate API key, the last record wins",
            ));
        }
    }

    for (group, entries) in &config.services {
        for (i, entry) in entries.iter().enumerate() {
            if !entry.enabled || entry.server_url.is_empty() {
                continue;
            }
            if let Err(e) = url::Url::parse(&entry.server_url) {
                errors.push(ValidationError::new(
                    format!("services.{group}[{i}].server_url"),
                    format!("invalid URL '{}': {}", entry.server_url, e),
                ));
            }
        }
    }

    for (model, params) in &config.params_range {
        check_range(&mut errors, format!("params_range.{model}.temperatureRange"), &params.temperature_range);
        check_range(&mut errors, format!("params_range.{model}.topPRange"), &params.top_p_range);
    }

    errors
}

/// Log every finding at warn level. Returns how many were logged.
pub fn report(config: &GatewayConfig) -> usize {
    let findings = validate_config(config);
    for finding in &findings {
        tracing::warn!(field = %finding.field, "Config warning: {}", finding.message);
    }
    findings.len()
}

fn check_range(errors: &mut Vec<ValidationError>, field: String, range: &Range) {
    if range.min > range.max {
        errors.push(ValidationError::new(
            field,
            format!("min {} is greater than max {}", range.min, range.max),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ApiKeyRecord, ModelParams, ProviderEntry};

    #[test]
    fn test_default_config_is_clean() {
        assert!(validate_config(&GatewayConfig::default()).is_empty());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.api_keys = vec![
            ApiKeyRecord { api_key: "".into(), ..Default::default() },
            ApiKeyRecord { api_key: "k1".into(), ..Default::default() },
            ApiKeyRecord { api_key: "k1".into(), ..Default::default() },
        ];
        config.services.insert(
            "svc".into(),
            vec![ProviderEntry {
                enabled: true,
                server_url: "not a url".into(),
                ..Default::default()
            }],
        );
        config.params_range.insert(
            "m1".into(),
            ModelParams {
                temperature_range: Range { min: 1.5, max: 0.5 },
                ..Default::default()
            },
        );

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0].field, "api_keys[0].api_key");
        assert_eq!(errors[1].message, "duplicate API key, the last record wins");
        assert!(errors[2].field.ends_with("server_url"));
        assert!(errors[3].field.contains("temperatureRange"));
    }

    #[test]
    fn test_disabled_entry_url_ignored() {
        let mut config = GatewayConfig::default();
        config.services.insert(
            "svc".into(),
            vec![ProviderEntry {
                enabled: false,
                server_url: "::::".into(),
                ..Default::default()
            }],
        );
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_valid_server_url() {
        let mut config = GatewayConfig::default();
        config.services.insert(
            "svc".into(),
            vec![ProviderEntry {
                enabled: true,
                server_url: "https://api.example.com/v1".into(),
                ..Default::default()
            }],
        );
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_findings_do_not_block() {
        let mut config = GatewayConfig::default();
        config.api_keys = vec![
            ApiKeyRecord { api_key: "k".into(), ..Default::default() },
            ApiKeyRecord { api_key: "k".into(), ..Default::default() },
        ];
        config.services.insert(
            "g".into(),
            vec![ProviderEntry {
                enabled: true,
                server_url: "api.example.com/v1".into(),
                ..Default::default()
            }],
        );
        assert_eq!(report(&config), 2);
    }
}
