// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ProofQuest integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! external services.
//!
//! # Components
//!
//! - [`MockVisionProvider`] - Vision provider replaying a scripted sequence of answers and failures
//! - [`MockBackend`] - In-memory backend that records link and submission calls
//! - [`RecordingAuditSink`] - Audit sink that keeps every record it receives

pub mod mock_audit;
pub mod mock_backend;
pub mod mock_provider;

pub use mock_audit::RecordingAuditSink;
pub use mock_backend::MockBackend;
pub use mock_provider::MockVisionProvider;
