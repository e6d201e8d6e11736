// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend data model shared by the API client, the agent, and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Telegram identity used as the unique user key across the backend.
pub type TelegramId = i64;

/// Backend identifier of a challenge.
pub type ChallengeId = i64;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Profile fields sent to `POST /users/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramProfile {
    pub telegram_id: TelegramId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl TelegramProfile {
    /// Profile used when no Telegram identity is available (local development).
    pub fn development() -> Self {
        Self {
            telegram_id: 123_456_789,
            first_name: Some("Test".into()),
            last_name: Some("User".into()),
            username: Some("testuser".into()),
            photo_url: Some("https://picsum.photos/seed/user/200".into()),
        }
    }
}

/// A signed-in user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub telegram_id: TelegramId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub balance: Option<f64>,
}

impl User {
    /// Fills profile fields the backend left empty from the login profile.
    ///
    /// Backend values win whenever both are present.
    pub fn merged_with(mut self, profile: &TelegramProfile) -> Self {
        fn fill(slot: &mut Option<String>, value: &Option<String>) {
            if slot.is_none() {
                slot.clone_from(value);
            }
        }
        fill(&mut self.username, &profile.username);
        fill(&mut self.first_name, &profile.first_name);
        fill(&mut self.last_name, &profile.last_name);
        fill(&mut self.photo_url, &profile.photo_url);
        self
    }

    /// Best human-readable label for the user.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| self.telegram_id.to_string())
    }
}

/// Lifecycle status of a challenge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChallengeStatus {
    Active,
    Expired,
}

/// A task definition published by the backend. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub reward_info: String,
    pub deadline: DateTime<Utc>,
    pub status: ChallengeStatus,
}

/// The durable record the backend creates for an accepted proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub challenge_id: ChallengeId,
    #[serde(default)]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// A submission listed for a user, joined with its challenge title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionWithChallenge {
    pub id: i64,
    pub challenge_id: ChallengeId,
    pub challenge_title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub image_mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /submissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub telegram_id: TelegramId,
    pub challenge_id: ChallengeId,
    /// Base64 payload without a data-URL prefix.
    pub image_data: String,
    pub image_mime_type: String,
}

/// Body of `POST /users/wallet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletLink {
    pub telegram_id: TelegramId,
    pub wallet_address: String,
}

/// Response of `POST /users/wallet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletLinkResponse {
    pub message: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One row of `GET /leaderboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub submission_count: u64,
}

/// Response of `GET /stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub active_challenges: u64,
    pub total_submissions: u64,
}
