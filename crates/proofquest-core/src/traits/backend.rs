// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend API trait covering users, challenges, and submissions.

use async_trait::async_trait;

use crate::error::ProofQuestError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Challenge, ChallengeId, LeaderboardEntry, NewSubmission, PlatformStats, Submission,
    SubmissionWithChallenge, TelegramId, TelegramProfile, User, WalletLinkResponse,
};

/// The ProofQuest backend as consumed by the client.
///
/// Non-2xx answers surface as [`ProofQuestError::Backend`] carrying the
/// backend's `detail` message.
#[async_trait]
pub trait BackendApi: PluginAdapter {
    /// Creates or refreshes the user for a Telegram identity.
    async fn login(&self, profile: &TelegramProfile) -> Result<User, ProofQuestError>;

    /// Stores a wallet address on the user.
    async fn link_wallet(
        &self,
        telegram_id: TelegramId,
        wallet_address: &str,
    ) -> Result<WalletLinkResponse, ProofQuestError>;

    /// Lists active challenges.
    async fn list_challenges(&self) -> Result<Vec<Challenge>, ProofQuestError>;

    /// Fetches one challenge by id.
    async fn get_challenge(&self, id: ChallengeId) -> Result<Challenge, ProofQuestError>;

    /// Persists a verified proof.
    async fn create_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Submission, ProofQuestError>;

    /// Lists a user's submissions with challenge titles.
    async fn user_submissions(
        &self,
        telegram_id: TelegramId,
    ) -> Result<Vec<SubmissionWithChallenge>, ProofQuestError>;

    /// Top users by submission count.
    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, ProofQuestError>;

    /// Platform-wide totals.
    async fn stats(&self) -> Result<PlatformStats, ProofQuestError>;
}
