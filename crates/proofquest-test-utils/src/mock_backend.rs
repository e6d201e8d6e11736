// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory backend for state machine and wallet watcher tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use proofquest_core::ProofQuestError;
use proofquest_core::traits::{BackendApi, PluginAdapter};
use proofquest_core::types::{
    Challenge, ChallengeId, HealthStatus, LeaderboardEntry, NewSubmission, PlatformStats,
    Submission, SubmissionWithChallenge, TelegramId, TelegramProfile, User, WalletLinkResponse,
};

/// A mock backend that records calls and replays scripted rejections.
///
/// Rejections queued with [`reject_next_submission`](Self::reject_next_submission)
/// or [`reject_next_link`](Self::reject_next_link) are consumed one per call
/// and surface as [`ProofQuestError::Backend`].
#[derive(Default)]
pub struct MockBackend {
    login_user: Mutex<Option<User>>,
    challenges: Mutex<Vec<Challenge>>,
    link_calls: Mutex<Vec<(TelegramId, String)>>,
    submissions: Mutex<Vec<NewSubmission>>,
    submission_rejections: Mutex<VecDeque<(String, u16)>>,
    link_rejections: Mutex<VecDeque<(String, u16)>>,
    link_count: AtomicUsize,
    submission_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `challenges` from the list and get endpoints.
    pub fn with_challenges(challenges: Vec<Challenge>) -> Self {
        Self {
            challenges: Mutex::new(challenges),
            ..Self::default()
        }
    }

    /// Return `user` from login instead of one derived from the profile.
    pub async fn set_login_user(&self, user: User) {
        *self.login_user.lock().await = Some(user);
    }

    pub async fn reject_next_submission(&self, detail: impl Into<String>, status: u16) {
        self.submission_rejections
            .lock()
            .await
            .push_back((detail.into(), status));
    }

    pub async fn reject_next_link(&self, detail: impl Into<String>, status: u16) {
        self.link_rejections
            .lock()
            .await
            .push_back((detail.into(), status));
    }

    /// Every link call received, including rejected ones.
    pub async fn link_calls(&self) -> Vec<(TelegramId, String)> {
        self.link_calls.lock().await.clone()
    }

    pub fn link_count(&self) -> usize {
        self.link_count.load(Ordering::SeqCst)
    }

    /// Every submission body received, including rejected ones.
    pub async fn submissions(&self) -> Vec<NewSubmission> {
        self.submissions.lock().await.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submission_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    async fn health_check(&self) -> Result<HealthStatus, ProofQuestError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn login(&self, profile: &TelegramProfile) -> Result<User, ProofQuestError> {
        if let Some(user) = self.login_user.lock().await.clone() {
            return Ok(user);
        }
        Ok(User {
            id: 1,
            telegram_id: profile.telegram_id,
            username: profile.username.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            photo_url: profile.photo_url.clone(),
            wallet_address: None,
            created_at: Utc::now(),
            balance: None,
        })
    }

    async fn link_wallet(
        &self,
        telegram_id: TelegramId,
        wallet_address: &str,
    ) -> Result<WalletLinkResponse, ProofQuestError> {
        self.link_count.fetch_add(1, Ordering::SeqCst);
        self.link_calls
            .lock()
            .await
            .push((telegram_id, wallet_address.to_string()));

        if let Some((message, status)) = self.link_rejections.lock().await.pop_front() {
            return Err(ProofQuestError::Backend { message, status });
        }
        Ok(WalletLinkResponse {
            message: "Wallet linked successfully".into(),
            wallet_address: Some(wallet_address.to_string()),
        })
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, ProofQuestError> {
        Ok(self.challenges.lock().await.clone())
    }

    async fn get_challenge(&self, id: ChallengeId) -> Result<Challenge, ProofQuestError> {
        self.challenges
            .lock()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ProofQuestError::Backend {
                message: "Challenge not found".into(),
                status: 404,
            })
    }

    async fn create_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Submission, ProofQuestError> {
        let count = self.submission_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.submissions.lock().await.push(submission.clone());

        if let Some((message, status)) = self.submission_rejections.lock().await.pop_front() {
            return Err(ProofQuestError::Backend { message, status });
        }
        Ok(Submission {
            id: count as i64,
            user_id: 1,
            challenge_id: submission.challenge_id,
            image_url: format!("https://cdn.example/submissions/{count}"),
            created_at: Utc::now(),
        })
    }

    async fn user_submissions(
        &self,
        telegram_id: TelegramId,
    ) -> Result<Vec<SubmissionWithChallenge>, ProofQuestError> {
        let challenges = self.challenges.lock().await.clone();
        let submissions = self.submissions.lock().await.clone();
        Ok(submissions
            .into_iter()
            .enumerate()
            .filter(|(_, s)| s.telegram_id == telegram_id)
            .map(|(i, s)| SubmissionWithChallenge {
                id: i as i64 + 1,
                challenge_id: s.challenge_id,
                challenge_title: challenges
                    .iter()
                    .find(|c| c.id == s.challenge_id)
                    .map(|c| c.title.clone())
                    .unwrap_or_default(),
                image_url: String::new(),
                image_data: Some(s.image_data),
                image_mime_type: Some(s.image_mime_type),
                created_at: Utc::now(),
            })
            .collect())
    }

    async fn leaderboard(&self, _limit: u32) -> Result<Vec<LeaderboardEntry>, ProofQuestError> {
        Ok(Vec::new())
    }

    async fn stats(&self) -> Result<PlatformStats, ProofQuestError> {
        Ok(PlatformStats {
            total_users: 1,
            active_challenges: self.challenges.lock().await.len() as u64,
            total_submissions: self.submission_count() as u64,
        })
    }
}
