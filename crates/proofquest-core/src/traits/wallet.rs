// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connected-wallet address signal.

use std::sync::Arc;

use tokio::sync::watch;

/// Capability of a wallet-connection provider: read the currently connected
/// address and subscribe to changes of it.
///
/// `None` and the empty string both mean "no wallet connected".
pub trait WalletSignal: Send + Sync + 'static {
    /// The address connected right now.
    fn current_address(&self) -> Option<String>;

    /// A receiver notified on every address change.
    fn subscribe(&self) -> watch::Receiver<Option<String>>;
}

/// In-process [`WalletSignal`] backed by a `tokio::sync::watch` channel.
///
/// The connection provider integration calls [`set`](Self::set) whenever the
/// user connects, switches, or disconnects a wallet.
#[derive(Debug, Clone)]
pub struct WatchWalletSignal {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl WatchWalletSignal {
    pub fn new(initial: Option<String>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Publishes a new connected address. Empty strings are stored as `None`.
    pub fn set(&self, address: Option<String>) {
        let address = address.filter(|a| !a.is_empty());
        self.tx.send_replace(address);
    }
}

impl Default for WatchWalletSignal {
    fn default() -> Self {
        Self::new(None)
    }
}

impl WalletSignal for WatchWalletSignal {
    fn current_address(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
