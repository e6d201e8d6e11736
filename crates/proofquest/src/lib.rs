// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations behind the `proofquest` binary.

pub mod app;
pub mod browse;
pub mod output;
pub mod prove;
pub mod show_config;
pub mod wallet;

pub use app::App;
