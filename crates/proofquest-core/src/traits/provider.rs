// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vision provider trait for the external AI plausibility check.

use async_trait::async_trait;

use crate::error::ProofQuestError;
use crate::traits::adapter::PluginAdapter;
use crate::verification::VisionRequest;

/// Adapter for an image-understanding model.
///
/// One call is one attempt: the provider performs no retries of its own, the
/// verification controller owns the retry policy.
#[async_trait]
pub trait VisionProvider: PluginAdapter {
    /// Model identifier recorded in audit records.
    fn model(&self) -> &str;

    /// Sends the image and prompt, returning the model's plain-text answer.
    async fn judge(&self, request: VisionRequest) -> Result<String, ProofQuestError>;
}
