// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `proofquest config`: print the effective configuration.

use proofquest_config::ProofQuestConfig;
use proofquest_core::ProofQuestError;

const REDACTED: &str = "<redacted>";

/// Renders `config` as TOML with secrets replaced.
pub fn render_config(config: &ProofQuestConfig) -> Result<String, ProofQuestError> {
    let mut shown = config.clone();
    if shown.gemini.api_key.is_some() {
        shown.gemini.api_key = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| ProofQuestError::Config(format!("failed to render config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_redacted() {
        let mut config = ProofQuestConfig::default();
        config.gemini.api_key = Some("AIza-secret".into());

        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("AIza-secret"));
        assert!(rendered.contains(REDACTED));
        assert!(rendered.contains("max_attempts = 3"));
    }

    #[test]
    fn rendered_config_loads_back() {
        let rendered = render_config(&ProofQuestConfig::default()).unwrap();
        let parsed = proofquest_config::load_config_from_str(&rendered).unwrap();
        assert_eq!(parsed.backend.base_url, "https://your-app.onrender.com");
    }
}
