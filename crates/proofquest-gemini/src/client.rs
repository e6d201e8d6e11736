// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Provides [`GeminiClient`], which handles request construction,
//! authentication, and error mapping. It performs exactly one HTTP call per
//! invocation; retry policy lives in the verification controller.

use std::time::Duration;

use proofquest_core::ProofQuestError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Default base URL of the Generative Language API.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client authenticated with `api_key`.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, ProofQuestError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                ProofQuestError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ProofQuestError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends one `generateContent` request for `model`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProofQuestError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProofQuestError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model, "generateContent response received");

        let body = response.text().await.map_err(|e| ProofQuestError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error ({} {}): {}",
                    api_err.error.code, api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(ProofQuestError::provider(message));
        }

        serde_json::from_str(&body).map_err(|e| ProofQuestError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-api-key", base_url, Duration::from_secs(5)).unwrap()
    }

    fn test_request() -> GenerateContentRequest {
        GenerateContentRequest::image_and_text("image/jpeg", "aGk=".into(), "Is it plausible?")
    }

    #[tokio::test]
    async fn generate_content_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"inlineData": {"mimeType": "image/jpeg", "data": "aGk="}}, {"text": "Is it plausible?"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Yes, it is."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let resp = client
            .generate_content("gemini-2.5-flash", &test_request())
            .await
            .unwrap();
        assert_eq!(resp.text().as_deref(), Some("Yes, it is."));
    }

    #[tokio::test]
    async fn api_error_envelope_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate_content("gemini-2.5-flash", &test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("INVALID_ARGUMENT"), "got: {err}");
        assert!(err.contains("API key not valid"), "got: {err}");
    }

    #[tokio::test]
    async fn non_json_error_body_is_reported_raw() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate_content("gemini-2.5-flash", &test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("503"), "got: {err}");
        assert!(err.contains("upstream overloaded"), "got: {err}");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = test_client("http://localhost:9/");
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
