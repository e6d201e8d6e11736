// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wallet reconciliation.
//!
//! Watches the connected-wallet signal and the session. When a user is signed
//! in and the connected address is non-empty and differs from the stored one,
//! the watcher links it through the backend and writes it into the session.
//! A failed link leaves the stored address alone and is not retried until the
//! connected address changes.

use std::sync::Arc;

use proofquest_core::ProofQuestError;
use proofquest_core::traits::{BackendApi, WalletSignal};
use proofquest_core::types::TelegramId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::UserSession;

/// What one reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    NoUser,
    NoWallet,
    InSync,
    /// The same address was already tried for this user and failed.
    AlreadyAttempted,
    Linked(String),
}

/// User-visible result of a link call made by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Linked { address: String },
    Failed { address: String, message: String },
}

/// Keeps the session's wallet address in sync with a [`WalletSignal`].
pub struct WalletWatcher {
    signal: Arc<dyn WalletSignal>,
    backend: Arc<dyn BackendApi>,
    session: UserSession,
    events: Option<mpsc::UnboundedSender<WalletEvent>>,
    last_attempted: Option<(TelegramId, String)>,
}

impl WalletWatcher {
    pub fn new(
        signal: Arc<dyn WalletSignal>,
        backend: Arc<dyn BackendApi>,
        session: UserSession,
    ) -> Self {
        Self {
            signal,
            backend,
            session,
            events: None,
            last_attempted: None,
        }
    }

    /// Reports link results on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<WalletEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Compares the connected and stored addresses once, linking on mismatch.
    pub async fn reconcile(&mut self) -> Result<Reconciliation, ProofQuestError> {
        let Some(user) = self.session.current() else {
            return Ok(Reconciliation::NoUser);
        };
        let Some(address) = self.signal.current_address().filter(|a| !a.is_empty()) else {
            self.last_attempted = None;
            return Ok(Reconciliation::NoWallet);
        };
        if user.wallet_address.as_deref() == Some(address.as_str()) {
            return Ok(Reconciliation::InSync);
        }

        let key = (user.telegram_id, address.clone());
        if self.last_attempted.as_ref() == Some(&key) {
            debug!(address, "link already attempted for this address");
            return Ok(Reconciliation::AlreadyAttempted);
        }
        self.last_attempted = Some(key);

        info!(
            telegram_id = user.telegram_id,
            address,
            previous = user.wallet_address.as_deref().unwrap_or(""),
            "linking wallet"
        );
        self.backend.link_wallet(user.telegram_id, &address).await?;

        self.session.set_wallet_address(&address);
        self.last_attempted = None;
        Ok(Reconciliation::Linked(address))
    }

    /// Reconciles on start, then on every signal or session change until `shutdown`.
    ///
    /// Pending changes are handled before shutdown is observed.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut wallet_rx = self.signal.subscribe();
        let mut user_rx = self.session.subscribe();
        wallet_rx.borrow_and_update();
        user_rx.borrow_and_update();

        self.reconcile_and_report().await;

        loop {
            tokio::select! {
                biased;
                changed = wallet_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    wallet_rx.borrow_and_update();
                }
                changed = user_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    user_rx.borrow_and_update();
                }
                _ = shutdown.cancelled() => break,
            }
            self.reconcile_and_report().await;
        }
        debug!("wallet watcher stopped");
    }

    async fn reconcile_and_report(&mut self) {
        let address = self.signal.current_address().unwrap_or_default();
        match self.reconcile().await {
            Ok(Reconciliation::Linked(address)) => {
                self.notify(WalletEvent::Linked { address });
            }
            Ok(_) => {}
            Err(e) => {
                warn!(address, error = %e, "failed to link wallet");
                self.notify(WalletEvent::Failed {
                    address,
                    message: e.to_string(),
                });
            }
        }
    }

    fn notify(&self, event: WalletEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use proofquest_core::types::User;
    use proofquest_core::WatchWalletSignal;
    use proofquest_test_utils::MockBackend;

    fn user(wallet: Option<&str>) -> User {
        User {
            id: 1,
            telegram_id: 42,
            username: Some("fran42".into()),
            first_name: None,
            last_name: None,
            photo_url: None,
            wallet_address: wallet.map(str::to_owned),
            created_at: Utc::now(),
            balance: None,
        }
    }

    fn setup(
        stored: Option<&str>,
        connected: Option<&str>,
    ) -> (WalletWatcher, WatchWalletSignal, Arc<MockBackend>, UserSession) {
        let signal = WatchWalletSignal::new(connected.map(str::to_owned));
        let backend = Arc::new(MockBackend::new());
        let session = UserSession::new();
        session.sign_in(user(stored));
        let watcher =
            WalletWatcher::new(Arc::new(signal.clone()), backend.clone(), session.clone());
        (watcher, signal, backend, session)
    }

    fn stored(session: &UserSession) -> Option<String> {
        session.current().and_then(|u| u.wallet_address)
    }

    #[tokio::test]
    async fn repeated_address_links_once() {
        let (mut watcher, signal, backend, session) = setup(Some("A"), Some("A"));
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::InSync);

        signal.set(Some("B".into()));
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::Linked("B".into()));
        signal.set(Some("B".into()));
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::InSync);

        assert_eq!(backend.link_calls().await, vec![(42, "B".to_string())]);
        assert_eq!(stored(&session).as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn disconnect_never_links() {
        let (mut watcher, signal, backend, session) = setup(Some("A"), Some("A"));

        signal.set(Some(String::new()));
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::NoWallet);
        signal.set(None);
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::NoWallet);

        assert_eq!(backend.link_count(), 0);
        assert_eq!(stored(&session).as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn no_user_means_no_link() {
        let (mut watcher, _signal, backend, session) = setup(None, Some("B"));
        session.sign_out();
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::NoUser);
        assert_eq!(backend.link_count(), 0);
    }

    #[tokio::test]
    async fn failed_link_keeps_address_and_waits_for_a_change() {
        let (mut watcher, signal, backend, session) = setup(Some("A"), Some("B"));
        backend.reject_next_link("Wallet already linked", 409).await;

        let err = watcher.reconcile().await.unwrap_err();
        assert_eq!(err.to_string(), "Wallet already linked");
        assert_eq!(stored(&session).as_deref(), Some("A"));

        signal.set(Some("B".into()));
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::AlreadyAttempted);
        assert_eq!(backend.link_count(), 1);

        signal.set(None);
        watcher.reconcile().await.unwrap();
        signal.set(Some("B".into()));
        assert_eq!(watcher.reconcile().await.unwrap(), Reconciliation::Linked("B".into()));
        assert_eq!(backend.link_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_reacts_to_signal_changes() {
        let (watcher, signal, backend, session) = setup(Some("A"), Some("A"));
        let (tx, mut events) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(watcher.with_events(tx).run(shutdown.clone()));

        signal.set(Some("B".into()));
        assert_eq!(
            events.recv().await,
            Some(WalletEvent::Linked { address: "B".into() })
        );
        assert_eq!(stored(&session).as_deref(), Some("B"));

        signal.set(Some("B".into()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.link_count(), 1);

        signal.set(Some(String::new()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.link_count(), 1);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_reports_failures() {
        let (watcher, signal, backend, _session) = setup(Some("A"), Some("A"));
        backend.reject_next_link("Invalid wallet address", 400).await;
        let (tx, mut events) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(watcher.with_events(tx).run(shutdown.clone()));

        signal.set(Some("not-a-wallet".into()));
        assert_eq!(
            events.recv().await,
            Some(WalletEvent::Failed {
                address: "not-a-wallet".into(),
                message: "Invalid wallet address".into(),
            })
        );

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_triggers_reconciliation() {
        let signal = WatchWalletSignal::new(Some("C".into()));
        let backend = Arc::new(MockBackend::new());
        let session = UserSession::new();
        let (tx, mut events) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let watcher = WalletWatcher::new(Arc::new(signal), backend.clone(), session.clone())
            .with_events(tx);
        let handle = tokio::spawn(watcher.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.link_count(), 0);

        session.sign_in(user(None));
        assert_eq!(
            events.recv().await,
            Some(WalletEvent::Linked { address: "C".into() })
        );

        shutdown.cancel();
        handle.await.unwrap();
    }
}
