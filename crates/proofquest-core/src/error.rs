// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for ProofQuest.

use thiserror::Error;

/// The primary error type used across all ProofQuest adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ProofQuestError {
    /// Configuration errors (invalid TOML, missing credentials, bad URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// AI provider errors (missing API key, non-2xx, unreadable response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered with a non-2xx status.
    ///
    /// Displays the backend's `detail` message verbatim so callers can show it
    /// to the user without reformatting.
    #[error("{message}")]
    Backend { message: String, status: u16 },

    /// The backend could not be reached or its response could not be decoded.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The captured image could not be read or is not an image.
    #[error("image error: {message}")]
    Image {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A state machine event arrived in a state that does not accept it.
    #[error("cannot {action} while {state}")]
    InvalidTransition { state: String, action: &'static str },

    /// An operation requires a signed-in user and there is none.
    #[error("no user is signed in")]
    NotSignedIn,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProofQuestError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an image error without an underlying source.
    pub fn image(message: impl Into<String>) -> Self {
        Self::Image {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the HTTP status for backend rejections.
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}
