// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retry loop around the vision provider.
//!
//! One call to [`VerificationController::verify`] is one verification
//! episode. Attempts run strictly in sequence; a failed attempt is followed by
//! the fixed [`RetryPolicy::delay`] before the next one. Any answer from the
//! model ends the loop, whether it approves or not. Exactly one
//! [`VerificationAttemptRecord`] is built per episode and handed to the
//! [`AuditEmitter`] once the verdict and duration are known.

use std::sync::Arc;
use std::time::Duration;

use proofquest_config::model::VerificationConfig;
use proofquest_core::image::CapturedImage;
use proofquest_core::traits::VisionProvider;
use proofquest_core::types::{ChallengeId, TelegramId};
use proofquest_core::verification::{Verdict, VerificationAttemptRecord, VisionRequest};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::audit::AuditEmitter;
use crate::prompt::PromptTemplate;

/// User-facing text for an episode that ended in [`Verdict::ApiError`].
pub const API_ERROR_MESSAGE: &str = "AI verification failed. Please try again.";

/// Attempt cap and fixed inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &VerificationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Who is verifying what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationTarget {
    pub telegram_id: TelegramId,
    pub challenge_id: ChallengeId,
    /// Task description embedded into the prompt.
    pub description: String,
}

/// Result of one verification episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub verdict: Verdict,
    /// Model text of the deciding attempt, shown to the user.
    pub raw_response: Option<String>,
    /// Number of provider calls made.
    pub attempts: u32,
    /// The audit record handed to the emitter.
    pub record: VerificationAttemptRecord,
}

impl VerificationOutcome {
    /// Message to show when the episode errored, `None` otherwise.
    pub fn error_message(&self) -> Option<&'static str> {
        (self.verdict == Verdict::ApiError).then_some(API_ERROR_MESSAGE)
    }
}

/// Drives verification attempts against a [`VisionProvider`].
pub struct VerificationController {
    provider: Arc<dyn VisionProvider>,
    prompt: PromptTemplate,
    policy: RetryPolicy,
    audit: AuditEmitter,
}

impl VerificationController {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        prompt: PromptTemplate,
        policy: RetryPolicy,
        audit: AuditEmitter,
    ) -> Self {
        Self {
            provider,
            prompt,
            policy,
            audit,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs one verification episode for `image`.
    ///
    /// Never fails: provider errors are retried and, once attempts run out,
    /// reported as [`Verdict::ApiError`].
    pub async fn verify(
        &self,
        target: &VerificationTarget,
        image: &CapturedImage,
    ) -> VerificationOutcome {
        let started = Instant::now();
        let prompt = self.prompt.render(&target.description);
        let model = self.provider.model().to_string();
        let max_attempts = self.policy.max_attempts.max(1);

        let mut record = VerificationAttemptRecord {
            user_telegram_id: target.telegram_id,
            challenge_id: target.challenge_id,
            image_data: image.to_base64(),
            image_mime_type: image.mime_type().to_string(),
            ai_model_used: model.clone(),
            ai_prompt: prompt.clone(),
            ai_raw_response: None,
            verification_result: Verdict::ApiError,
            error_message: None,
            api_call_duration_ms: 0,
        };

        let mut attempts = 0;
        let mut answered = false;

        while attempts < max_attempts {
            attempts += 1;
            let request = VisionRequest {
                model: model.clone(),
                prompt: prompt.clone(),
                image: image.clone(),
            };

            match self.provider.judge(request).await {
                Ok(text) => {
                    let verdict = Verdict::from_response_text(&text);
                    debug!(attempt = attempts, %verdict, "model answered");
                    record.verification_result = verdict;
                    record.ai_raw_response = Some(text);
                    answered = true;
                    break;
                }
                Err(e) => {
                    warn!(
                        attempt = attempts,
                        max_attempts,
                        challenge_id = target.challenge_id,
                        error = %e,
                        "AI verification attempt failed"
                    );
                    record.error_message = Some(e.to_string());
                    if attempts < max_attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        if !answered {
            error!(
                attempts,
                challenge_id = target.challenge_id,
                "all AI verification attempts failed"
            );
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        record.api_call_duration_ms = duration_ms;

        info!(
            challenge_id = target.challenge_id,
            verdict = %record.verification_result,
            attempts,
            duration_ms,
            "verification finished"
        );

        self.audit.emit(record.clone());

        VerificationOutcome {
            verdict: record.verification_result,
            raw_response: record.ai_raw_response.clone(),
            attempts,
            record,
        }
    }
}
