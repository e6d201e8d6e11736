// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all network adapters implement.

use async_trait::async_trait;

use crate::error::ProofQuestError;
use crate::types::HealthStatus;

/// The base trait for ProofQuest adapters.
///
/// Provides identity and a health probe used by `proofquest health`.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, ProofQuestError>;
}
