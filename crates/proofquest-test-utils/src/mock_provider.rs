// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock vision provider for deterministic testing.
//!
//! `MockVisionProvider` implements `VisionProvider` with a pre-configured
//! script, enabling retry tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use proofquest_core::ProofQuestError;
use proofquest_core::traits::{PluginAdapter, VisionProvider};
use proofquest_core::types::HealthStatus;
use proofquest_core::verification::VisionRequest;

/// A mock vision provider that replays scripted outcomes.
///
/// Each call pops the next entry: `Ok(text)` is returned as the model answer,
/// `Err(message)` becomes a provider error. When the script is exhausted,
/// every call fails.
pub struct MockVisionProvider {
    script: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<VisionRequest>>>,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    /// Create a provider with an empty script.
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    /// Create a provider pre-loaded with outcomes.
    pub fn with_script(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append an outcome to the script.
    pub async fn push(&self, outcome: Result<String, String>) {
        self.script.lock().await.push_back(outcome);
    }

    /// Number of `judge` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockVisionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockVisionProvider {
    fn name(&self) -> &str {
        "mock-vision"
    }

    async fn health_check(&self) -> Result<HealthStatus, ProofQuestError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn model(&self) -> &str {
        "mock-vision"
    }

    async fn judge(&self, request: VisionRequest) -> Result<String, ProofQuestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);

        match self.script.lock().await.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ProofQuestError::provider(message)),
            None => Err(ProofQuestError::provider("mock script exhausted")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofquest_core::CapturedImage;

    fn request() -> VisionRequest {
        VisionRequest {
            model: "mock-vision".into(),
            prompt: "p".into(),
            image: CapturedImage::new(b"x".to_vec(), "image/png").unwrap(),
        }
    }

    #[tokio::test]
    async fn replays_script_in_order() {
        let provider = MockVisionProvider::with_script(vec![Err("down".into()), Ok("Yes".into())]);

        assert!(provider.judge(request()).await.is_err());
        assert_eq!(provider.judge(request()).await.unwrap(), "Yes");
        assert!(provider.judge(request()).await.is_err());
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.requests().await.len(), 3);
    }
}
