// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for ProofQuest's external collaborators.
//!
//! Network-backed adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod audit;
pub mod backend;
pub mod provider;
pub mod wallet;

pub use adapter::PluginAdapter;
pub use audit::AuditSink;
pub use backend::BackendApi;
pub use provider::VisionProvider;
pub use wallet::{WalletSignal, WatchWalletSignal};
