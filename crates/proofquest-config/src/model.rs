// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for ProofQuest.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use proofquest_core::TelegramProfile;
use serde::{Deserialize, Serialize};

/// Top-level ProofQuest configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProofQuestConfig {
    /// Client behavior settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Backend API settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Gemini vision model settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Verification retry and prompt settings.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Telegram identity used to sign in from the CLI.
    #[serde(default)]
    pub user: UserConfig,
}

/// Client behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Delay between a successful submission and the close signal.
    #[serde(default = "default_close_delay_ms")]
    pub close_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            close_delay_ms: default_close_delay_ms(),
        }
    }
}

impl AppConfig {
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_close_delay_ms() -> u64 {
    2000
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend, without trailing slash.
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

fn default_backend_url() -> String {
    "https://your-app.onrender.com".to_string()
}

fn default_backend_timeout() -> u64 {
    30
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` falls back to `GEMINI_API_KEY` / `API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for plausibility checks.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_url(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout() -> u64 {
    60
}

/// Built-in prompt wordings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptPreset {
    /// Backend challenges: judge whether the image relates to the request.
    #[default]
    Challenge,
    /// Bounties: judge the core task, tolerate unverifiable details.
    Bounty,
}

/// Verification retry and prompt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationConfig {
    /// Maximum model calls per verify action.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay after a failed attempt.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Built-in prompt wording.
    #[serde(default)]
    pub prompt: PromptPreset,

    /// Custom template; must contain `{description}`. Overrides `prompt`.
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            prompt: PromptPreset::default(),
            prompt_template: None,
        }
    }
}

impl VerificationConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// Telegram identity configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Telegram user id. `None` selects the development profile.
    #[serde(default)]
    pub telegram_id: Option<i64>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub photo_url: Option<String>,
}

impl UserConfig {
    /// Login profile for this configuration.
    pub fn profile(&self) -> TelegramProfile {
        match self.telegram_id {
            Some(telegram_id) => TelegramProfile {
                telegram_id,
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                username: self.username.clone(),
                photo_url: self.photo_url.clone(),
            },
            None => TelegramProfile::development(),
        }
    }
}
