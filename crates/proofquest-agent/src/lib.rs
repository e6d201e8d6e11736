// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side orchestration for ProofQuest.
//!
//! - [`UserSession`] holds the signed-in user in an observable cell.
//! - [`SubmissionMachine`] turns a captured image into a verified, submitted
//!   proof for one challenge.
//! - [`WalletWatcher`] keeps the user's linked wallet address in sync with the
//!   connected wallet.

pub mod session;
pub mod submission;
pub mod wallet;

pub use session::UserSession;
pub use submission::{SubmissionMachine, SubmissionState};
pub use wallet::{Reconciliation, WalletEvent, WalletWatcher};
