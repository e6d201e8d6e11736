// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates for the plausibility check.

use proofquest_config::model::{PromptPreset, VerificationConfig};
use proofquest_config::validation::DESCRIPTION_PLACEHOLDER;
use proofquest_core::ProofQuestError;

/// Wording used for backend challenges.
pub const CHALLENGE_TEMPLATE: &str = "Analyze the provided image to see if it is related to this request: \"{description}\". Focus on the main subject. Is it a plausible submission? Respond with only \"Yes\" or \"No\", followed by a brief, one-sentence explanation.";

/// Wording used for user-posted bounties.
pub const BOUNTY_TEMPLATE: &str = "Analyze the provided image to see if it fulfills the core task of this request: \"{description}\". Focus on the main subject (e.g., a pothole on a street, a specific product on a shelf) rather than getting stuck on exact, hard-to-verify details like street numbers from the image alone. Is it a plausible submission? Respond with only \"Yes\" or \"No\", followed by a brief, one-sentence explanation.";

/// A prompt with a single `{description}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn challenge() -> Self {
        Self {
            template: CHALLENGE_TEMPLATE.to_string(),
        }
    }

    pub fn bounty() -> Self {
        Self {
            template: BOUNTY_TEMPLATE.to_string(),
        }
    }

    /// A caller-supplied template. It must contain `{description}`.
    pub fn custom(template: impl Into<String>) -> Result<Self, ProofQuestError> {
        let template = template.into();
        if !template.contains(DESCRIPTION_PLACEHOLDER) {
            return Err(ProofQuestError::Config(format!(
                "prompt template must contain {DESCRIPTION_PLACEHOLDER}"
            )));
        }
        Ok(Self { template })
    }

    /// Selects the template from configuration. A custom template wins over the preset.
    pub fn from_config(config: &VerificationConfig) -> Result<Self, ProofQuestError> {
        match &config.prompt_template {
            Some(template) => Self::custom(template.clone()),
            None => Ok(match config.prompt {
                PromptPreset::Challenge => Self::challenge(),
                PromptPreset::Bounty => Self::bounty(),
            }),
        }
    }

    /// Embeds the task description.
    pub fn render(&self, description: &str) -> String {
        self.template.replace(DESCRIPTION_PLACEHOLDER, description)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::challenge()
    }
}
