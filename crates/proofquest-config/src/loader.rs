// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./proofquest.toml` > `~/.config/proofquest/proofquest.toml`
//! > `/etc/proofquest/proofquest.toml` with environment variable overrides via
//! the `PROOFQUEST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ProofQuestConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/proofquest/proofquest.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "proofquest.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/proofquest/proofquest.toml` (system-wide)
/// 3. `~/.config/proofquest/proofquest.toml` (user XDG config)
/// 4. `./proofquest.toml` (local directory)
/// 5. `PROOFQUEST_*` environment variables
pub fn load_config() -> Result<ProofQuestConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ProofQuestConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ProofQuestConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ProofQuestConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ProofQuestConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ProofQuestConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("proofquest").join(LOCAL_CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `PROOFQUEST_GEMINI_API_KEY` must map to `gemini.api_key`, not
/// `gemini.api.key`.
fn env_provider() -> Env {
    Env::prefixed("PROOFQUEST_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        for section in SECTIONS {
            if let Some(rest) = key
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key.into()
    })
}

/// Top-level sections addressable from the environment.
const SECTIONS: &[&str] = &["app", "backend", "gemini", "verification", "user"];
