// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sink for verification audit records.

use async_trait::async_trait;

use crate::error::ProofQuestError;
use crate::verification::VerificationAttemptRecord;

/// Destination for completed verification audit records.
///
/// Implementations may fail; callers treat delivery as best effort.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    /// Transmits one record.
    async fn record(&self, record: &VerificationAttemptRecord) -> Result<(), ProofQuestError>;
}
