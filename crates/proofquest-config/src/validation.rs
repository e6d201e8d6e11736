// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, attempt counts, and template placeholders.

use crate::diagnostic::ConfigError;
use crate::model::ProofQuestConfig;

/// Placeholder that custom prompt templates must contain.
pub const DESCRIPTION_PLACEHOLDER: &str = "{description}";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ProofQuestConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    check_http_url("backend.base_url", &config.backend.base_url, &mut errors);
    check_http_url("gemini.base_url", &config.gemini.base_url, &mut errors);

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::invalid("gemini.model", "must not be empty"));
    }

    if config.verification.max_attempts < 1 {
        errors.push(ConfigError::invalid(
            "verification.max_attempts",
            format!("must be at least 1, got {}", config.verification.max_attempts),
        ));
    }

    if let Some(template) = &config.verification.prompt_template
        && !template.contains(DESCRIPTION_PLACEHOLDER)
    {
        errors.push(ConfigError::invalid(
            "verification.prompt_template",
            format!("must contain `{DESCRIPTION_PLACEHOLDER}`"),
        ));
    }

    if !LOG_LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::invalid(
            "app.log_level",
            format!(
                "`{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    for (key, secs) in [
        ("backend.timeout_secs", config.backend.timeout_secs),
        ("gemini.timeout_secs", config.gemini.timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::invalid(key, "must be at least 1 second"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(key: &str, value: &str, errors: &mut Vec<ConfigError>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(ConfigError::invalid(key, "must not be empty"));
    } else if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(ConfigError::invalid(
            key,
            format!("`{value}` must start with http:// or https://"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_key(errors: &[ConfigError], key: &str) -> bool {
        errors.iter().any(|e| e.key() == Some(key))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ProofQuestConfig::default()).is_ok());
    }

    #[test]
    fn zero_attempts_fails_validation() {
        let mut config = ProofQuestConfig::default();
        config.verification.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_key(&errors, "verification.max_attempts"));
    }

    #[test]
    fn template_without_placeholder_fails_validation() {
        let mut config = ProofQuestConfig::default();
        config.verification.prompt_template = Some("Is this a cat?".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_key(&errors, "verification.prompt_template"));
    }

    #[test]
    fn non_http_backend_url_fails_validation() {
        let mut config = ProofQuestConfig::default();
        config.backend.base_url = "ftp://example.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_key(&errors, "backend.base_url"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ProofQuestConfig::default();
        config.backend.base_url = String::new();
        config.app.log_level = "loud".into();
        config.verification.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn zero_timeout_names_the_section() {
        let mut config = ProofQuestConfig::default();
        config.gemini.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_key(&errors, "gemini.timeout_secs"));
    }
}
