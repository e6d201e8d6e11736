// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only commands: challenges, submissions, leaderboard, stats, health.

use chrono::{DateTime, Utc};
use colored::Colorize;
use proofquest_core::ProofQuestError;
use proofquest_core::traits::{BackendApi, PluginAdapter};
use proofquest_core::types::{
    Challenge, ChallengeId, ChallengeStatus, HealthStatus, LeaderboardEntry,
};

use crate::app::App;
use crate::output::{heading, health_line, truncate};

/// True when the challenge no longer accepts proofs.
pub fn is_closed(challenge: &Challenge, now: DateTime<Utc>) -> bool {
    challenge.status == ChallengeStatus::Expired || challenge.deadline < now
}

/// One line of the challenge list.
pub fn challenge_row(challenge: &Challenge, now: DateTime<Utc>) -> String {
    let state = if is_closed(challenge, now) {
        "expired"
    } else {
        "active"
    };
    format!(
        "    #{:<4} {:<40} {:<14} due {} ({state})",
        challenge.id,
        truncate(&challenge.title, 40),
        truncate(&challenge.reward_info, 14),
        challenge.deadline.format("%Y-%m-%d"),
    )
}

fn leaderboard_name(entry: &LeaderboardEntry) -> &str {
    entry
        .username
        .as_deref()
        .or(entry.first_name.as_deref())
        .unwrap_or("anonymous")
}

pub async fn run_challenges(app: &App) -> Result<(), ProofQuestError> {
    let challenges = app.backend.list_challenges().await?;
    let now = Utc::now();

    heading("Challenges");
    if challenges.is_empty() {
        println!("    No active challenges.");
    }
    for challenge in &challenges {
        println!("{}", challenge_row(challenge, now));
    }
    println!();
    Ok(())
}

pub async fn run_challenge(
    app: &App,
    id: ChallengeId,
    use_color: bool,
) -> Result<(), ProofQuestError> {
    let challenge = app.backend.get_challenge(id).await?;
    let closed = is_closed(&challenge, Utc::now());

    heading(&challenge.title);
    println!("    {}", challenge.description);
    println!();
    if use_color {
        println!("    Reward:   {}", challenge.reward_info.cyan());
    } else {
        println!("    Reward:   {}", challenge.reward_info);
    }
    println!("    Deadline: {}", challenge.deadline.format("%Y-%m-%d %H:%M UTC"));
    println!("    Status:   {}", if closed { "expired" } else { "active" });
    if !challenge.image_url.is_empty() {
        println!("    Image:    {}", challenge.image_url);
    }
    println!();
    Ok(())
}

pub async fn run_submissions(app: &App) -> Result<(), ProofQuestError> {
    let user = app.sign_in().await?;
    let submissions = app.backend.user_submissions(user.telegram_id).await?;

    heading(&format!("Submissions of {}", user.display_name()));
    if submissions.is_empty() {
        println!("    No submissions yet.");
    }
    for s in &submissions {
        println!(
            "    #{:<4} {:<40} {}",
            s.challenge_id,
            truncate(&s.challenge_title, 40),
            s.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    Ok(())
}

pub async fn run_leaderboard(app: &App, limit: u32) -> Result<(), ProofQuestError> {
    let entries = app.backend.leaderboard(limit).await?;

    heading("Leaderboard");
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "    {:>3}. {:<24} {}",
            rank + 1,
            truncate(leaderboard_name(entry), 24),
            entry.submission_count
        );
    }
    println!();
    Ok(())
}

pub async fn run_stats(app: &App) -> Result<(), ProofQuestError> {
    let stats = app.backend.stats().await?;

    heading("Platform");
    println!("    Users:             {}", stats.total_users);
    println!("    Active challenges: {}", stats.active_challenges);
    println!("    Submissions:       {}", stats.total_submissions);
    println!();
    Ok(())
}

/// Prints adapter health. Returns true when every adapter is healthy.
pub async fn run_health(app: &App, use_color: bool) -> Result<bool, ProofQuestError> {
    let backend = app.backend.health_check().await?;
    let provider = app.provider.health_check().await?;

    heading("proofquest health");
    println!("{}", health_line(app.backend.name(), &backend, use_color));
    println!("{}", health_line(app.provider.name(), &provider, use_color));
    println!("    Backend:  {}", app.backend.base_url());
    println!("    Model:    {}", app.config.gemini.model);
    println!();

    Ok(backend == HealthStatus::Healthy && provider == HealthStatus::Healthy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn challenge(status: ChallengeStatus, deadline: DateTime<Utc>) -> Challenge {
        Challenge {
            id: 12,
            title: "Find the blue door".into(),
            description: "A photo of the blue door on Elm St".into(),
            image_url: String::new(),
            reward_info: "5 TON".into(),
            deadline,
            status,
        }
    }

    #[test]
    fn past_deadline_counts_as_closed() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();

        assert!(is_closed(&challenge(ChallengeStatus::Active, past), now));
        assert!(is_closed(&challenge(ChallengeStatus::Expired, future), now));
        assert!(!is_closed(&challenge(ChallengeStatus::Active, future), now));
    }

    #[test]
    fn challenge_row_shows_id_and_state() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let row = challenge_row(&challenge(ChallengeStatus::Active, future), now);
        assert!(row.contains("#12"));
        assert!(row.contains("due 2026-07-01 (active)"));
    }

    #[test]
    fn leaderboard_name_falls_back() {
        let entry = LeaderboardEntry {
            username: None,
            first_name: Some("Fran".into()),
            photo_url: None,
            submission_count: 3,
        };
        assert_eq!(leaderboard_name(&entry), "Fran");
    }
}
