// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `proofquest prove`: verify a photo against a challenge and optionally submit it.

use std::path::PathBuf;

use chrono::Utc;
use proofquest_core::ProofQuestError;
use proofquest_core::image::CapturedImage;
use proofquest_core::traits::BackendApi;
use proofquest_core::types::{Challenge, ChallengeId, Submission};
use proofquest_core::verification::Verdict;
use tracing::warn;

use crate::app::App;
use crate::browse::is_closed;
use crate::output::{heading, verdict_label};

/// Arguments of one `prove` run.
#[derive(Debug, Clone)]
pub struct ProveRequest {
    pub challenge_id: ChallengeId,
    pub image: PathBuf,
    pub submit: bool,
}

/// What a `prove` run ended with.
#[derive(Debug, Clone)]
pub struct ProveReport {
    pub challenge: Challenge,
    pub verdict: Verdict,
    pub ai_response: Option<String>,
    /// Generic verification error or the backend's rejection message.
    pub error: Option<String>,
    pub submission: Option<Submission>,
}

impl ProveReport {
    /// True when the run reached what was asked of it.
    pub fn succeeded(&self, submit_requested: bool) -> bool {
        self.verdict.is_approved() && (!submit_requested || self.submission.is_some())
    }
}

/// Runs image selection, verification, and (if requested) submission.
///
/// After a successful submission this waits for the close signal.
pub async fn run_prove(app: &App, request: &ProveRequest) -> Result<ProveReport, ProofQuestError> {
    app.sign_in().await?;
    let challenge = app.backend.get_challenge(request.challenge_id).await?;
    if is_closed(&challenge, Utc::now()) {
        warn!(challenge_id = challenge.id, "challenge looks closed, the backend may reject it");
    }

    let image = CapturedImage::from_path(&request.image).await?;
    let mut machine = app.submission_machine(&challenge);
    machine.select_image(image);

    let outcome = machine.verify().await?;

    let mut submission = None;
    if request.submit && machine.can_submit() {
        match machine.submit().await {
            Ok(created) => {
                submission = Some(created);
                machine.close_signal().cancelled().await;
            }
            Err(e) => warn!(error = %e, "submission failed"),
        }
    }

    Ok(ProveReport {
        challenge,
        verdict: outcome.verdict,
        ai_response: outcome.raw_response,
        error: machine.error().map(str::to_owned),
        submission,
    })
}

pub fn print_report(report: &ProveReport, use_color: bool) {
    heading(&report.challenge.title);
    println!("    Result:   {}", verdict_label(report.verdict, use_color));
    if let Some(text) = &report.ai_response {
        println!("    AI says:  {text}");
    }
    if let Some(error) = &report.error {
        println!("    Error:    {error}");
    }
    if let Some(submission) = &report.submission {
        println!("    Submitted as #{}. Reward: {}", submission.id, report.challenge.reward_info);
    } else if report.verdict.is_approved() {
        println!("    Re-run with --submit to send this proof.");
    }
    println!();
}
