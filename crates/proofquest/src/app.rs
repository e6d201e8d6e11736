// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of adapters, controller, and session from configuration.

use std::sync::Arc;
use std::time::Duration;

use proofquest_agent::{SubmissionMachine, UserSession};
use proofquest_api::BackendClient;
use proofquest_config::ProofQuestConfig;
use proofquest_core::ProofQuestError;
use proofquest_core::types::{Challenge, TelegramProfile, User};
use proofquest_gemini::GeminiProvider;
use proofquest_verify::{AuditEmitter, PromptTemplate, RetryPolicy, VerificationController};
use tracing::info;

/// How long shutdown waits for audit deliveries still in flight.
const AUDIT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything a command needs, built once per process.
pub struct App {
    pub config: ProofQuestConfig,
    pub backend: Arc<BackendClient>,
    pub provider: Arc<GeminiProvider>,
    pub audit: AuditEmitter,
    pub controller: Arc<VerificationController>,
    pub session: UserSession,
}

impl App {
    pub fn new(config: ProofQuestConfig) -> Result<Self, ProofQuestError> {
        let backend = Arc::new(BackendClient::new(&config.backend)?);
        let provider = Arc::new(GeminiProvider::new(&config.gemini)?);
        let audit = AuditEmitter::new(backend.clone());
        let controller = Arc::new(VerificationController::new(
            provider.clone(),
            PromptTemplate::from_config(&config.verification)?,
            RetryPolicy::from_config(&config.verification),
            audit.clone(),
        ));

        Ok(Self {
            config,
            backend,
            provider,
            audit,
            controller,
            session: UserSession::new(),
        })
    }

    /// Signs in with the configured Telegram profile.
    pub async fn sign_in(&self) -> Result<User, ProofQuestError> {
        let profile = self.config.user.profile();
        if profile == TelegramProfile::development() {
            info!("no [user] identity configured, using the development profile");
        }
        self.session.login(self.backend.as_ref(), &profile).await
    }

    /// A fresh submission flow for `challenge`.
    pub fn submission_machine(&self, challenge: &Challenge) -> SubmissionMachine {
        SubmissionMachine::new(
            challenge.id,
            challenge.description.clone(),
            self.controller.clone(),
            self.backend.clone(),
            self.session.clone(),
            self.config.app.close_delay(),
        )
    }

    /// Lets pending audit deliveries finish before the process exits.
    pub async fn shutdown(&self) {
        self.audit.flush(AUDIT_FLUSH_TIMEOUT).await;
    }
}
