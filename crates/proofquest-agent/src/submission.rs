// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle of one proof submission.
//!
//! States: Idle -> ImageSelected -> Verifying -> Verified | VerificationFailed
//! -> Submitting -> Submitted. A rejected submission returns to Verified with
//! the backend's message kept in [`SubmissionMachine::error`].
//!
//! A verdict is bound to the SHA-256 fingerprint of the image it was produced
//! against. Selecting a new image from any state discards it.

use std::sync::Arc;
use std::time::Duration;

use proofquest_core::ProofQuestError;
use proofquest_core::image::CapturedImage;
use proofquest_core::traits::BackendApi;
use proofquest_core::types::{ChallengeId, NewSubmission, Submission};
use proofquest_core::verification::Verdict;
use proofquest_verify::{VerificationController, VerificationOutcome, VerificationTarget};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::UserSession;

/// States in the submission FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// No image picked yet.
    Idle,
    /// An image is held and has no verdict.
    ImageSelected,
    /// A verification episode is in flight.
    Verifying,
    /// The held image was approved.
    Verified,
    /// The last episode rejected the image or errored. Verification may be retried.
    VerificationFailed,
    /// The backend call is in flight.
    Submitting,
    /// The backend accepted the proof.
    Submitted,
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::ImageSelected => write!(f, "image selected"),
            SubmissionState::Verifying => write!(f, "verifying"),
            SubmissionState::Verified => write!(f, "verified"),
            SubmissionState::VerificationFailed => write!(f, "verification failed"),
            SubmissionState::Submitting => write!(f, "submitting"),
            SubmissionState::Submitted => write!(f, "submitted"),
        }
    }
}

/// An approval tied to the bytes it was produced against.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Approval {
    fingerprint: String,
}

/// Drives one challenge's proof from image selection to submission.
///
/// Methods take `&mut self`, so at most one verification or submission can be
/// in flight per machine.
pub struct SubmissionMachine {
    challenge_id: ChallengeId,
    description: String,
    controller: Arc<VerificationController>,
    backend: Arc<dyn BackendApi>,
    session: UserSession,
    close_delay: Duration,
    close: CancellationToken,
    pending_close: Option<CancellationToken>,

    state: SubmissionState,
    image: Option<CapturedImage>,
    approval: Option<Approval>,
    verdict: Option<Verdict>,
    ai_response: Option<String>,
    error: Option<String>,
    submission: Option<Submission>,
}

impl SubmissionMachine {
    /// Creates a machine for the task `challenge_id` described by `description`.
    pub fn new(
        challenge_id: ChallengeId,
        description: impl Into<String>,
        controller: Arc<VerificationController>,
        backend: Arc<dyn BackendApi>,
        session: UserSession,
        close_delay: Duration,
    ) -> Self {
        Self {
            challenge_id,
            description: description.into(),
            controller,
            backend,
            session,
            close_delay,
            close: CancellationToken::new(),
            pending_close: None,
            state: SubmissionState::Idle,
            image: None,
            approval: None,
            verdict: None,
            ai_response: None,
            error: None,
            submission: None,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn challenge_id(&self) -> ChallengeId {
        self.challenge_id
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    /// Verdict of the last episode for the held image.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Model text of the last episode for the held image.
    pub fn ai_response(&self) -> Option<&str> {
        self.ai_response.as_deref()
    }

    /// User-facing error of the last action, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    /// Cancelled `close_delay` after a successful submission.
    ///
    /// Each selected image starts a new proof with a fresh signal, so callers
    /// take the token after `select_image`.
    pub fn close_signal(&self) -> CancellationToken {
        self.close.clone()
    }

    pub fn can_verify(&self) -> bool {
        matches!(
            self.state,
            SubmissionState::ImageSelected | SubmissionState::VerificationFailed
        )
    }

    /// True only when the held bytes carry an approval.
    pub fn can_submit(&self) -> bool {
        self.state == SubmissionState::Verified && self.approved_image().is_some()
    }

    /// Holds `image` and discards any verdict, response, and error.
    pub fn select_image(&mut self, image: CapturedImage) {
        debug!(
            challenge_id = self.challenge_id,
            previous = %self.state,
            fingerprint = image.fingerprint(),
            "image selected"
        );
        self.image = Some(image);
        self.approval = None;
        self.verdict = None;
        self.ai_response = None;
        self.error = None;
        self.submission = None;
        if let Some(pending) = self.pending_close.take() {
            pending.cancel();
        }
        self.close = CancellationToken::new();
        self.state = SubmissionState::ImageSelected;
    }

    /// Runs one verification episode for the held image.
    ///
    /// Allowed from `ImageSelected` and `VerificationFailed` only. A rejected
    /// or errored episode is not an `Err`: it moves the machine to
    /// `VerificationFailed` and is reported through the outcome.
    ///
    /// Dropping the returned future mid-episode leaves the machine in
    /// `Verifying`; only `select_image` leaves that state afterwards.
    pub async fn verify(&mut self) -> Result<VerificationOutcome, ProofQuestError> {
        if !self.can_verify() {
            return Err(self.invalid("verify"));
        }
        let image = self.image.clone().ok_or_else(|| self.invalid("verify"))?;
        let user = self.session.require()?;

        self.state = SubmissionState::Verifying;
        self.approval = None;
        self.verdict = None;
        self.ai_response = None;
        self.error = None;

        let target = VerificationTarget {
            telegram_id: user.telegram_id,
            challenge_id: self.challenge_id,
            description: self.description.clone(),
        };
        let outcome = self.controller.verify(&target, &image).await;

        self.verdict = Some(outcome.verdict);
        self.ai_response = outcome.raw_response.clone();
        self.error = outcome.error_message().map(str::to_owned);

        if outcome.verdict.is_approved() {
            self.approval = Some(Approval {
                fingerprint: image.fingerprint().to_string(),
            });
            self.state = SubmissionState::Verified;
        } else {
            self.state = SubmissionState::VerificationFailed;
        }
        info!(
            challenge_id = self.challenge_id,
            verdict = %outcome.verdict,
            state = %self.state,
            "verification complete"
        );

        Ok(outcome)
    }

    /// Sends the approved image to the backend.
    ///
    /// On success the machine is `Submitted` and the close signal fires after
    /// `close_delay`. On failure the machine returns to `Verified` with the
    /// verdict intact and the error's message stored verbatim.
    pub async fn submit(&mut self) -> Result<Submission, ProofQuestError> {
        if self.state != SubmissionState::Verified {
            return Err(self.invalid("submit"));
        }
        let image = self
            .approved_image()
            .cloned()
            .ok_or_else(|| self.invalid("submit"))?;
        let user = self.session.require()?;

        self.state = SubmissionState::Submitting;
        self.error = None;

        let body = NewSubmission {
            telegram_id: user.telegram_id,
            challenge_id: self.challenge_id,
            image_data: image.to_base64(),
            image_mime_type: image.mime_type().to_string(),
        };

        match self.backend.create_submission(&body).await {
            Ok(submission) => {
                info!(
                    challenge_id = self.challenge_id,
                    submission_id = submission.id,
                    "proof submitted"
                );
                self.state = SubmissionState::Submitted;
                self.submission = Some(submission.clone());
                self.schedule_close();
                Ok(submission)
            }
            Err(e) => {
                warn!(challenge_id = self.challenge_id, error = %e, "submission rejected");
                self.state = SubmissionState::Verified;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The held image, if the current approval was produced against its bytes.
    fn approved_image(&self) -> Option<&CapturedImage> {
        let image = self.image.as_ref()?;
        let approval = self.approval.as_ref()?;
        (approval.fingerprint == image.fingerprint()).then_some(image)
    }

    /// Fires the close signal after `close_delay` unless a new image is
    /// selected first.
    fn schedule_close(&mut self) {
        let close = self.close.clone();
        let abandoned = CancellationToken::new();
        self.pending_close = Some(abandoned.clone());
        let delay = self.close_delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = abandoned.cancelled() => {
                    debug!("close abandoned, new image selected");
                }
                _ = tokio::time::sleep(delay) => {
                    debug!("closing after submission");
                    close.cancel();
                }
            }
        });
    }

    fn invalid(&self, action: &'static str) -> ProofQuestError {
        ProofQuestError::InvalidTransition {
            state: self.state.to_string(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofquest_core::types::TelegramProfile;
    use proofquest_test_utils::{MockBackend, MockVisionProvider, RecordingAuditSink};
    use proofquest_verify::{AuditEmitter, PromptTemplate, RetryPolicy};

    struct Fixture {
        machine: SubmissionMachine,
        provider: Arc<MockVisionProvider>,
        backend: Arc<MockBackend>,
    }

    async fn fixture(script: Vec<Result<String, String>>) -> Fixture {
        let provider = Arc::new(MockVisionProvider::with_script(script));
        let backend = Arc::new(MockBackend::new());
        let controller = Arc::new(VerificationController::new(
            provider.clone(),
            PromptTemplate::challenge(),
            RetryPolicy::default(),
            AuditEmitter::new(Arc::new(RecordingAuditSink::new())),
        ));
        let session = UserSession::new();
        session
            .login(backend.as_ref(), &TelegramProfile::development())
            .await
            .unwrap();

        let machine = SubmissionMachine::new(
            3,
            "A bike rack",
            controller,
            backend.clone(),
            session,
            Duration::from_secs(2),
        );
        Fixture {
            machine,
            provider,
            backend,
        }
    }

    fn image(bytes: &[u8]) -> CapturedImage {
        CapturedImage::new(bytes.to_vec(), "image/jpeg").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn happy_path_submits_and_closes() {
        let mut f = fixture(vec![Ok("Yes, a bike rack.".into())]).await;
        assert_eq!(f.machine.state(), SubmissionState::Idle);

        f.machine.select_image(image(b"proof"));
        assert_eq!(f.machine.state(), SubmissionState::ImageSelected);

        let outcome = f.machine.verify().await.unwrap();
        assert_eq!(outcome.verdict, Verdict::Approved);
        assert_eq!(f.machine.state(), SubmissionState::Verified);
        assert_eq!(f.machine.ai_response(), Some("Yes, a bike rack."));

        let close = f.machine.close_signal();
        let submission = f.machine.submit().await.unwrap();
        assert_eq!(submission.challenge_id, 3);
        assert_eq!(f.machine.state(), SubmissionState::Submitted);
        assert!(!close.is_cancelled());

        tokio::time::timeout(Duration::from_secs(3), close.cancelled())
            .await
            .unwrap();

        let sent = f.backend.submissions().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].telegram_id, 123_456_789);
        assert_eq!(sent[0].image_data, image(b"proof").to_base64());
        assert_eq!(sent[0].image_mime_type, "image/jpeg");
    }

    #[tokio::test(start_paused = true)]
    async fn reselecting_image_clears_verdict() {
        let mut f = fixture(vec![Ok("Yes.".into())]).await;
        f.machine.select_image(image(b"first"));
        f.machine.verify().await.unwrap();
        assert!(f.machine.can_submit());

        f.machine.select_image(image(b"second"));
        assert_eq!(f.machine.state(), SubmissionState::ImageSelected);
        assert!(f.machine.verdict().is_none());
        assert!(f.machine.ai_response().is_none());
        assert!(!f.machine.can_submit());

        let err = f.machine.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "cannot submit while image selected");
        assert_eq!(f.backend.submission_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn new_image_after_submit_gets_its_own_close_delay() {
        let mut f = fixture(vec![Ok("Yes.".into()), Ok("Yes, again.".into())]).await;
        f.machine.select_image(image(b"first"));
        f.machine.verify().await.unwrap();
        let first_close = f.machine.close_signal();
        f.machine.submit().await.unwrap();

        f.machine.select_image(image(b"second"));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!first_close.is_cancelled());
        assert_eq!(f.machine.state(), SubmissionState::ImageSelected);

        let second_close = f.machine.close_signal();
        f.machine.verify().await.unwrap();
        f.machine.submit().await.unwrap();
        assert!(!second_close.is_cancelled());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!second_close.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), second_close.cancelled())
            .await
            .unwrap();
        assert_eq!(f.backend.submission_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn close_signal_survives_until_delay_after_submit() {
        let mut f = fixture(vec![Ok("Yes.".into())]).await;
        f.machine.select_image(image(b"proof"));
        f.machine.verify().await.unwrap();
        let close = f.machine.close_signal();
        f.machine.submit().await.unwrap();

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(!close.is_cancelled());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(close.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn reselecting_identical_bytes_still_requires_verification() {
        let mut f = fixture(vec![Ok("Yes.".into())]).await;
        f.machine.select_image(image(b"same"));
        f.machine.verify().await.unwrap();

        f.machine.select_image(image(b"same"));
        assert!(f.machine.submit().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_allows_retrying_verification() {
        let mut f = fixture(vec![
            Ok("No, the image does not show a bike rack.".into()),
            Ok("Yes, now it does.".into()),
        ])
        .await;
        f.machine.select_image(image(b"proof"));

        let outcome = f.machine.verify().await.unwrap();
        assert_eq!(outcome.verdict, Verdict::Rejected);
        assert_eq!(f.machine.state(), SubmissionState::VerificationFailed);
        assert!(f.machine.error().is_none());
        assert!(matches!(
            f.machine.submit().await,
            Err(ProofQuestError::InvalidTransition { .. })
        ));

        f.machine.verify().await.unwrap();
        assert_eq!(f.machine.state(), SubmissionState::Verified);
        assert_eq!(f.provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn api_error_surfaces_generic_message() {
        let mut f = fixture(vec![Err("a".into()), Err("b".into()), Err("c".into())]).await;
        f.machine.select_image(image(b"proof"));

        let outcome = f.machine.verify().await.unwrap();
        assert_eq!(outcome.verdict, Verdict::ApiError);
        assert_eq!(f.machine.state(), SubmissionState::VerificationFailed);
        assert_eq!(f.machine.error(), Some("AI verification failed. Please try again."));
    }

    #[tokio::test(start_paused = true)]
    async fn backend_rejection_returns_to_verified() {
        let mut f = fixture(vec![Ok("Yes.".into())]).await;
        f.backend.reject_next_submission("Challenge expired", 400).await;
        f.machine.select_image(image(b"proof"));
        f.machine.verify().await.unwrap();

        let err = f.machine.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Challenge expired");
        assert_eq!(f.machine.state(), SubmissionState::Verified);
        assert_eq!(f.machine.error(), Some("Challenge expired"));
        assert_eq!(f.machine.verdict(), Some(Verdict::Approved));
        assert!(!f.machine.close_signal().is_cancelled());

        // Retry without re-verifying.
        f.machine.submit().await.unwrap();
        assert_eq!(f.machine.state(), SubmissionState::Submitted);
        assert!(f.machine.error().is_none());
        assert_eq!(f.provider.call_count(), 1);
        assert_eq!(f.backend.submission_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn guards_reject_out_of_order_events() {
        let mut f = fixture(vec![Ok("Yes.".into())]).await;

        let err = f.machine.verify().await.unwrap_err();
        assert_eq!(err.to_string(), "cannot verify while idle");

        f.machine.select_image(image(b"proof"));
        f.machine.verify().await.unwrap();
        let err = f.machine.verify().await.unwrap_err();
        assert_eq!(err.to_string(), "cannot verify while verified");
        assert_eq!(f.provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn verification_requires_signed_in_user() {
        let mut f = fixture(vec![Ok("Yes.".into())]).await;
        f.machine.session.sign_out();
        f.machine.select_image(image(b"proof"));

        assert!(matches!(
            f.machine.verify().await,
            Err(ProofQuestError::NotSignedIn)
        ));
        assert_eq!(f.machine.state(), SubmissionState::ImageSelected);
        assert_eq!(f.provider.call_count(), 0);
    }
}
