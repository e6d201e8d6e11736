// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for ProofQuest.
//!
//! This crate provides the error type, the data model shared with the
//! backend, captured images, verdicts, and the adapter traits implemented by
//! the Gemini provider, the backend client, and the test mocks.

pub mod error;
pub mod image;
pub mod traits;
pub mod types;
pub mod verification;

// Re-export key items at crate root for ergonomic imports.
pub use error::ProofQuestError;
pub use image::CapturedImage;
pub use types::{
    Challenge, ChallengeId, ChallengeStatus, HealthStatus, Submission, TelegramId,
    TelegramProfile, User,
};
pub use verification::{Verdict, VerificationAttemptRecord, VisionRequest};

pub use traits::{
    AuditSink, BackendApi, PluginAdapter, VisionProvider, WalletSignal, WatchWalletSignal,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_render() {
        let backend = ProofQuestError::Backend {
            message: "Challenge expired".into(),
            status: 400,
        };
        assert_eq!(backend.to_string(), "Challenge expired");
        assert_eq!(backend.backend_status(), Some(400));

        let transition = ProofQuestError::InvalidTransition {
            state: "verifying".into(),
            action: "submit",
        };
        assert_eq!(transition.to_string(), "cannot submit while verifying");

        assert!(ProofQuestError::provider("boom").to_string().contains("boom"));
        assert_eq!(ProofQuestError::NotSignedIn.backend_status(), None);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_vision<T: VisionProvider>() {}
        fn _assert_backend<T: BackendApi>() {}
        fn _assert_audit<T: AuditSink>() {}
        fn _assert_wallet<T: WalletSignal>() {}
        _assert_wallet::<WatchWalletSignal>();
    }
}
