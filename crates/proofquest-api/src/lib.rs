// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the ProofQuest backend.
//!
//! [`BackendClient`] implements [`BackendApi`](proofquest_core::BackendApi)
//! for users, challenges, and submissions, and
//! [`AuditSink`](proofquest_core::AuditSink) for `POST /verification-logs`.

pub mod client;

pub use client::BackendClient;
