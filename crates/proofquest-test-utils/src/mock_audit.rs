// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit sink that records what it receives.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use proofquest_core::ProofQuestError;
use proofquest_core::traits::AuditSink;
use proofquest_core::verification::VerificationAttemptRecord;

/// Keeps every audit record in memory, optionally failing each delivery.
///
/// Records are kept even when delivery is configured to fail, so tests can
/// count emissions either way.
#[derive(Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<VerificationAttemptRecord>>,
    failure: Option<String>,
    notify: Notify,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose deliveries all fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Snapshot of the records received so far.
    pub fn records(&self) -> Vec<VerificationAttemptRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Waits until at least `count` records arrived, then returns them all.
    pub async fn wait_for(&self, count: usize) -> Vec<VerificationAttemptRecord> {
        loop {
            let notified = self.notify.notified();
            let records = self.records();
            if records.len() >= count {
                return records;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, record: &VerificationAttemptRecord) -> Result<(), ProofQuestError> {
        match self.records.lock() {
            Ok(mut records) => records.push(record.clone()),
            Err(poisoned) => poisoned.into_inner().push(record.clone()),
        }
        self.notify.notify_waiters();

        match &self.failure {
            Some(message) => Err(ProofQuestError::Backend {
                message: message.clone(),
                status: 500,
            }),
            None => Ok(()),
        }
    }
}
