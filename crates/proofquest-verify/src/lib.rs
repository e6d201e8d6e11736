// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI plausibility verification for ProofQuest.
//!
//! - [`VerificationController`] drives bounded, fixed-delay retries against a
//!   [`VisionProvider`](proofquest_core::VisionProvider) and produces one
//!   terminal verdict plus one aggregated audit record.
//! - [`PromptTemplate`] renders the yes/no instruction for a task description.
//! - [`AuditEmitter`] hands finished records to an audit sink without ever
//!   blocking or failing the caller.

pub mod audit;
pub mod controller;
pub mod prompt;

pub use audit::AuditEmitter;
pub use controller::{
    API_ERROR_MESSAGE, RetryPolicy, VerificationController, VerificationOutcome,
    VerificationTarget,
};
pub use prompt::PromptTemplate;
