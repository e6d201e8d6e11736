// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `proofquest link-wallet` and `proofquest watch-wallet`.

use std::sync::Arc;

use proofquest_agent::{Reconciliation, WalletEvent, WalletWatcher};
use proofquest_core::ProofQuestError;
use proofquest_core::traits::WatchWalletSignal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::app::App;
use crate::output::marker;

/// Links `address` once, the way the watcher would for a connected wallet.
pub async fn run_link_wallet(
    app: &App,
    address: &str,
) -> Result<Reconciliation, ProofQuestError> {
    app.sign_in().await?;
    let signal = WatchWalletSignal::new(Some(address.to_string()));
    let mut watcher = WalletWatcher::new(
        Arc::new(signal),
        app.backend.clone(),
        app.session.clone(),
    );
    watcher.reconcile().await
}

pub fn print_reconciliation(result: &Reconciliation, use_color: bool) {
    match result {
        Reconciliation::Linked(address) => {
            println!("  {} wallet linked: {address}", marker(true, use_color));
        }
        Reconciliation::InSync => println!("  {} wallet already linked", marker(true, use_color)),
        Reconciliation::NoWallet => println!("  {} no wallet address given", marker(false, use_color)),
        Reconciliation::NoUser => println!("  {} not signed in", marker(false, use_color)),
        Reconciliation::AlreadyAttempted => {
            println!("  {} link already attempted", marker(false, use_color));
        }
    }
}

fn print_event(event: &WalletEvent, use_color: bool) {
    match event {
        WalletEvent::Linked { address } => {
            println!("  {} wallet linked: {address}", marker(true, use_color));
        }
        WalletEvent::Failed { address, message } => {
            println!("  {} could not link {address}: {message}", marker(false, use_color));
        }
    }
}

/// Feeds connected-wallet addresses from `input`, one per line, to a running
/// watcher. An empty line means the wallet disconnected.
///
/// Returns the watcher's events once input ends or Ctrl+C is pressed.
pub async fn run_watch_wallet<R>(
    app: &App,
    input: R,
    use_color: bool,
) -> Result<Vec<WalletEvent>, ProofQuestError>
where
    R: AsyncBufRead + Unpin,
{
    app.sign_in().await?;

    let signal = WatchWalletSignal::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let watcher = WalletWatcher::new(
        Arc::new(signal.clone()),
        app.backend.clone(),
        app.session.clone(),
    )
    .with_events(tx);
    let handle = tokio::spawn(watcher.run(shutdown.clone()));

    let mut lines = input.lines();
    let mut events = Vec::new();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|e| ProofQuestError::Internal(format!("failed to read input: {e}")))?;
                match line {
                    Some(address) => {
                        let address = address.trim().to_string();
                        debug!(address, "connected wallet changed");
                        signal.set(Some(address));
                    }
                    None => break,
                }
            }
            Some(event) = rx.recv() => {
                print_event(&event, use_color);
                events.push(event);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    shutdown.cancel();
    handle
        .await
        .map_err(|e| ProofQuestError::Internal(format!("wallet watcher panicked: {e}")))?;
    while let Some(event) = rx.recv().await {
        print_event(&event, use_color);
        events.push(event);
    }
    Ok(events)
}
