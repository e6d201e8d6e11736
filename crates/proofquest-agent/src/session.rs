// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The signed-in user, shared between the submission flow and the wallet watcher.
//!
//! Writers overwrite fields in place; the last write wins.

use std::sync::Arc;

use proofquest_core::ProofQuestError;
use proofquest_core::traits::BackendApi;
use proofquest_core::types::{TelegramProfile, User};
use tokio::sync::watch;
use tracing::{debug, info};

/// Observable cell holding the current [`User`], if any.
#[derive(Debug, Clone)]
pub struct UserSession {
    tx: Arc<watch::Sender<Option<User>>>,
}

impl UserSession {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Signs in through the backend and stores the result.
    ///
    /// Profile fields the backend leaves empty are filled from `profile`.
    pub async fn login(
        &self,
        backend: &dyn BackendApi,
        profile: &TelegramProfile,
    ) -> Result<User, ProofQuestError> {
        let user = backend.login(profile).await?.merged_with(profile);
        info!(
            telegram_id = user.telegram_id,
            user = %user.display_name(),
            "signed in"
        );
        self.sign_in(user.clone());
        Ok(user)
    }

    pub fn sign_in(&self, user: User) {
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    /// Returns the signed-in user or [`ProofQuestError::NotSignedIn`].
    pub fn require(&self) -> Result<User, ProofQuestError> {
        self.current().ok_or(ProofQuestError::NotSignedIn)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }

    /// Overwrites the stored wallet address. Returns false when nobody is signed in.
    pub fn set_wallet_address(&self, address: &str) -> bool {
        let updated = self.tx.send_if_modified(|user| match user {
            Some(user) if user.wallet_address.as_deref() != Some(address) => {
                user.wallet_address = Some(address.to_string());
                true
            }
            _ => false,
        });
        if updated {
            debug!(address, "session wallet address updated");
        }
        updated
    }
}

impl Default for UserSession {
    fn default() -> Self {
        Self::new()
    }
}
