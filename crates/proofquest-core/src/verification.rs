// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verdicts and the audit record of one verification episode.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::image::CapturedImage;
use crate::types::{ChallengeId, TelegramId};

/// Terminal classification of one verification episode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The model judged the image a plausible proof.
    Approved,
    /// The model answered, but not with "yes".
    Rejected,
    /// Every attempt failed before the model answered.
    ApiError,
}

impl Verdict {
    /// Classifies model text: approved iff it starts with "yes", ignoring case.
    pub fn from_response_text(text: &str) -> Self {
        let starts_with_yes = text
            .get(..3)
            .is_some_and(|head| head.eq_ignore_ascii_case("yes"));
        if starts_with_yes {
            Verdict::Approved
        } else {
            Verdict::Rejected
        }
    }

    pub fn is_approved(self) -> bool {
        self == Verdict::Approved
    }
}

/// One request to the external vision model.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Fully rendered prompt text.
    pub prompt: String,
    /// The image to judge.
    pub image: CapturedImage,
}

/// Audit payload for one verification episode, posted to `/verification-logs`.
///
/// Built once per verify action and finalized exactly once. Response and error
/// fields hold whatever the last attempt produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationAttemptRecord {
    pub user_telegram_id: TelegramId,
    pub challenge_id: ChallengeId,
    pub image_data: String,
    pub image_mime_type: String,
    pub ai_model_used: String,
    pub ai_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_raw_response: Option<String>,
    pub verification_result: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub api_call_duration_ms: u64,
}
