// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend HTTP client and response handling.

use std::time::Duration;

use async_trait::async_trait;
use proofquest_config::model::BackendConfig;
use proofquest_core::error::ProofQuestError;
use proofquest_core::traits::{AuditSink, BackendApi, PluginAdapter};
use proofquest_core::types::{
    BackendHealth, Challenge, ChallengeId, HealthStatus, LeaderboardEntry, NewSubmission,
    PlatformStats, Submission, SubmissionWithChallenge, TelegramId, TelegramProfile, User,
    WalletLink, WalletLinkResponse,
};
use proofquest_core::verification::VerificationAttemptRecord;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Client for the ProofQuest REST backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client from the `[backend]` section.
    pub fn new(config: &BackendConfig) -> Result<Self, ProofQuestError> {
        Self::with_timeout(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ProofQuestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProofQuestError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<BackendHealth, ProofQuestError> {
        self.get("/health").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProofQuestError> {
        debug!(path, "GET");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProofQuestError> {
        debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(response).await
    }
}

fn transport_error(e: reqwest::Error) -> ProofQuestError {
    ProofQuestError::Transport {
        message: format!("request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Decodes a 2xx body, or turns a non-2xx answer into [`ProofQuestError::Backend`].
///
/// The backend's `detail` string is surfaced verbatim. Without one, the
/// message falls back to the status reason phrase, then to
/// `HTTP error! status: {code}`.
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ProofQuestError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| ProofQuestError::Transport {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !status.is_success() {
        return Err(backend_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| ProofQuestError::Transport {
        message: format!("failed to decode response: {e}"),
        source: Some(Box::new(e)),
    })
}

fn backend_error(status: StatusCode, body: &str) -> ProofQuestError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_owned))
        .filter(|d| !d.is_empty());

    ProofQuestError::Backend {
        message: detail
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
        status: status.as_u16(),
    }
}

#[async_trait]
impl PluginAdapter for BackendClient {
    fn name(&self) -> &str {
        "backend"
    }

    async fn health_check(&self) -> Result<HealthStatus, ProofQuestError> {
        Ok(match self.health().await {
            Ok(h) if h.status == "healthy" => HealthStatus::Healthy,
            Ok(h) => HealthStatus::Degraded(format!("backend reports `{}`", h.status)),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn login(&self, profile: &TelegramProfile) -> Result<User, ProofQuestError> {
        self.post("/users/login", profile).await
    }

    async fn link_wallet(
        &self,
        telegram_id: TelegramId,
        wallet_address: &str,
    ) -> Result<WalletLinkResponse, ProofQuestError> {
        let body = WalletLink {
            telegram_id,
            wallet_address: wallet_address.to_string(),
        };
        self.post("/users/wallet", &body).await
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, ProofQuestError> {
        let mut challenges: Vec<Challenge> = self.get("/challenges").await?;
        challenges.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(challenges)
    }

    async fn get_challenge(&self, id: ChallengeId) -> Result<Challenge, ProofQuestError> {
        self.get(&format!("/challenges/{id}")).await
    }

    async fn create_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Submission, ProofQuestError> {
        self.post("/submissions", submission).await
    }

    async fn user_submissions(
        &self,
        telegram_id: TelegramId,
    ) -> Result<Vec<SubmissionWithChallenge>, ProofQuestError> {
        self.get(&format!("/submissions/user/{telegram_id}")).await
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, ProofQuestError> {
        self.get(&format!("/leaderboard?limit={limit}")).await
    }

    async fn stats(&self) -> Result<PlatformStats, ProofQuestError> {
        self.get("/stats").await
    }
}

#[async_trait]
impl AuditSink for BackendClient {
    async fn record(&self, record: &VerificationAttemptRecord) -> Result<(), ProofQuestError> {
        let response = self
            .client
            .post(self.url("/verification-logs"))
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body, "verification log rejected");
            return Err(backend_error(status, &body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofquest_core::verification::Verdict;
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::with_timeout(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn challenge_json(id: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": format!("Challenge {id}"),
            "description": "Photograph a bike rack",
            "image_url": "https://picsum.photos/400",
            "reward_info": "10 TON",
            "deadline": "2026-12-31T23:59:59Z",
            "status": "active"
        })
    }

    #[tokio::test]
    async fn login_posts_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/login"))
            .and(body_partial_json(serde_json::json!({
                "telegram_id": 42,
                "username": "fran42"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1,
                "telegram_id": 42,
                "username": "fran42",
                "wallet_address": "EQA",
                "created_at": "2026-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = TelegramProfile {
            telegram_id: 42,
            first_name: None,
            last_name: None,
            username: Some("fran42".into()),
            photo_url: None,
        };
        let user = client(&server).login(&profile).await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.wallet_address.as_deref(), Some("EQA"));
    }

    #[tokio::test]
    async fn challenges_are_sorted_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/challenges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                challenge_json(2),
                challenge_json(7),
                challenge_json(4)
            ])))
            .mount(&server)
            .await;

        let ids: Vec<_> = client(&server)
            .list_challenges()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![7, 4, 2]);
    }

    #[tokio::test]
    async fn submission_rejection_surfaces_detail_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submissions"))
            .and(body_json(serde_json::json!({
                "telegram_id": 42,
                "challenge_id": 3,
                "image_data": "aGk=",
                "image_mime_type": "image/jpeg"
            })))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"detail": "Challenge expired"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .create_submission(&NewSubmission {
                telegram_id: 42,
                challenge_id: 3,
                image_data: "aGk=".into(),
                image_mime_type: "image/jpeg".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Challenge expired");
        assert_eq!(err.backend_status(), Some(400));
    }

    #[tokio::test]
    async fn non_json_error_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/submissions/user/42"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server).user_submissions(42).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.backend_status(), Some(502));
    }

    #[test]
    fn unknown_status_without_detail_uses_code() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = backend_error(status, "{}");
        assert_eq!(err.to_string(), "HTTP error! status: 599");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let client =
            BackendClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.stats().await.unwrap_err();
        assert!(matches!(err, ProofQuestError::Transport { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn link_wallet_and_leaderboard() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/wallet"))
            .and(body_json(serde_json::json!({
                "telegram_id": 42,
                "wallet_address": "EQB"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Wallet linked successfully",
                "wallet_address": "EQB"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/leaderboard"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"username": "a", "first_name": null, "photo_url": null, "submission_count": 9}
            ])))
            .mount(&server)
            .await;

        let client = client(&server);
        let linked = client.link_wallet(42, "EQB").await.unwrap();
        assert_eq!(linked.message, "Wallet linked successfully");

        let board = client.leaderboard(5).await.unwrap();
        assert_eq!(board[0].submission_count, 9);
    }

    #[tokio::test]
    async fn audit_record_posts_to_verification_logs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verification-logs"))
            .and(body_partial_json(serde_json::json!({
                "verification_result": "REJECTED",
                "ai_raw_response": "No."
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let record = VerificationAttemptRecord {
            user_telegram_id: 42,
            challenge_id: 3,
            image_data: "aGk=".into(),
            image_mime_type: "image/png".into(),
            ai_model_used: "gemini-2.5-flash".into(),
            ai_prompt: "prompt".into(),
            ai_raw_response: Some("No.".into()),
            verification_result: Verdict::Rejected,
            error_message: None,
            api_call_duration_ms: 120,
        };
        client(&server).record(&record).await.unwrap();
    }

    #[tokio::test]
    async fn health_check_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "healthy",
                "database": "connected"
            })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
