// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini vision provider for ProofQuest.
//!
//! This crate implements [`VisionProvider`] on top of the Gemini
//! `generateContent` endpoint, sending the image inline next to the prompt.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use proofquest_config::model::GeminiConfig;
use proofquest_core::error::ProofQuestError;
use proofquest_core::traits::{PluginAdapter, VisionProvider};
use proofquest_core::types::HealthStatus;
use proofquest_core::verification::VisionRequest;
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::GenerateContentRequest;

/// Message used when no API key is configured.
///
/// A missing key is a per-attempt failure rather than a startup error, so the
/// verification flow records it like any other provider failure.
pub const MISSING_KEY_MESSAGE: &str = "API key is missing.";

/// Gemini provider implementing [`VisionProvider`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` -> `API_KEY`.
pub struct GeminiProvider {
    client: Option<GeminiClient>,
    model: String,
}

impl GeminiProvider {
    /// Creates a provider from configuration.
    pub fn new(config: &GeminiConfig) -> Result<Self, ProofQuestError> {
        let api_key = resolve_api_key(&config.api_key);
        let client = match api_key {
            Some(key) => Some(GeminiClient::new(
                &key,
                &config.base_url,
                Duration::from_secs(config.timeout_secs),
            )?),
            None => {
                warn!("no Gemini API key configured; verification attempts will fail");
                None
            }
        };

        info!(model = config.model, "Gemini provider initialized");

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    /// Creates a provider with an existing client (for testing).
    pub fn with_client(client: Option<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn health_check(&self) -> Result<HealthStatus, ProofQuestError> {
        Ok(match self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Unhealthy(MISSING_KEY_MESSAGE.to_string()),
        })
    }
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn judge(&self, request: VisionRequest) -> Result<String, ProofQuestError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ProofQuestError::provider(MISSING_KEY_MESSAGE))?;

        let body = GenerateContentRequest::image_and_text(
            request.image.mime_type(),
            request.image.to_base64(),
            &request.prompt,
        );
        let response = client.generate_content(&request.model, &body).await?;

        match response.text() {
            Some(text) => {
                debug!(model = request.model, len = text.len(), "model answered");
                Ok(text)
            }
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .or_else(|| {
                        response
                            .candidates
                            .first()
                            .and_then(|c| c.finish_reason.clone())
                    })
                    .unwrap_or_else(|| "unknown".to_string());
                Err(ProofQuestError::provider(format!(
                    "model returned no text (reason: {reason})"
                )))
            }
        }
    }
}

/// Resolves the API key: non-empty config value first, then the environment.
fn resolve_api_key(config_key: &Option<String>) -> Option<String> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Some(key.clone());
    }

    ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
}
