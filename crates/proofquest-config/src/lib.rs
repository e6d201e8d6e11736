// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for ProofQuest.
//!
//! Settings come from `proofquest.toml` files layered over compiled defaults,
//! with `PROOFQUEST_*` environment overrides on top. Unknown keys are
//! rejected and reported through miette with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use proofquest_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Backend: {}", config.backend.base_url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ProofQuestConfig;

use std::path::{Path, PathBuf};

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<ProofQuestConfig, Vec<ConfigError>> {
    checked(loader::load_config(), search_paths)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<ProofQuestConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || vec![path.to_path_buf()])
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ProofQuestConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &[("<inline>".to_string(), toml_content.to_string())],
        )),
    }
}

/// Validates a parsed config, or turns a figment failure into diagnostics.
///
/// `paths` is only consulted on failure, to re-read sources for labels.
fn checked(
    loaded: Result<ProofQuestConfig, figment::Error>,
    paths: impl FnOnce() -> Vec<PathBuf>,
) -> Result<ProofQuestConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => validation::validate_config(&config).map(|()| config),
        Err(err) => {
            let sources: Vec<(String, String)> = paths()
                .into_iter()
                .filter_map(|path| {
                    let content = std::fs::read_to_string(&path).ok()?;
                    Some((path.display().to_string(), content))
                })
                .collect();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Config files consulted by [`load_and_validate`], lowest precedence first.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(loader::SYSTEM_CONFIG_PATH)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("proofquest").join(loader::LOCAL_CONFIG_FILE));
    }
    paths.push(
        std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_FILE))
            .unwrap_or_else(|_| PathBuf::from(loader::LOCAL_CONFIG_FILE)),
    );
    paths
}
