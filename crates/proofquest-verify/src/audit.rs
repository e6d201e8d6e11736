// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget delivery of verification audit records.

use std::sync::Arc;
use std::time::Duration;

use proofquest_core::traits::AuditSink;
use proofquest_core::verification::VerificationAttemptRecord;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Hands audit records to an [`AuditSink`] on a detached task.
///
/// [`emit`](Self::emit) returns immediately. Delivery failures are logged at
/// `warn` and never reach the caller.
#[derive(Clone, Default)]
pub struct AuditEmitter {
    sink: Option<Arc<dyn AuditSink>>,
    tracker: TaskTracker,
}

impl AuditEmitter {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink: Some(sink),
            tracker: TaskTracker::new(),
        }
    }

    /// An emitter that drops every record.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Spawns delivery of `record`. Must be called from within a Tokio runtime.
    ///
    /// The returned handle is only useful to tests; callers normally drop it.
    pub fn emit(&self, record: VerificationAttemptRecord) -> Option<JoinHandle<()>> {
        let Some(sink) = self.sink.clone() else {
            debug!("audit emitter disabled, dropping record");
            return None;
        };

        Some(self.tracker.spawn(async move {
            match sink.record(&record).await {
                Ok(()) => debug!(
                    challenge_id = record.challenge_id,
                    verdict = %record.verification_result,
                    "verification attempt logged"
                ),
                Err(e) => warn!(
                    challenge_id = record.challenge_id,
                    error = %e,
                    "failed to log verification attempt"
                ),
            }
        }))
    }
}

impl AuditEmitter {
    /// Waits up to `timeout` for deliveries still in flight.
    ///
    /// For short-lived processes that would otherwise exit before the
    /// detached tasks run. Returns false if the timeout elapsed first.
    pub async fn flush(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        self.tracker.reopen();
        if !drained {
            warn!(pending = self.tracker.len(), "audit deliveries still pending");
        }
        drained
    }
}

impl std::fmt::Debug for AuditEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditEmitter")
            .field("enabled", &self.sink.is_some())
            .field("pending", &self.tracker.len())
            .finish()
    }
}
