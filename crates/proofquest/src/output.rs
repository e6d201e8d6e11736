// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output helpers.

use std::io::IsTerminal;

use colored::Colorize;
use proofquest_core::types::HealthStatus;
use proofquest_core::verification::Verdict;

/// Colors are used only on a terminal and when `--plain` is not set.
pub fn use_color(plain: bool) -> bool {
    !plain && std::io::stdout().is_terminal()
}

pub fn heading(title: &str) {
    println!();
    println!("  {title}");
    println!("  {}", "-".repeat(35));
}

/// A `[OK]`/`[FAIL]` style marker.
pub fn marker(ok: bool, use_color: bool) -> String {
    match (ok, use_color) {
        (true, true) => "✓".green().to_string(),
        (false, true) => "✗".red().to_string(),
        (true, false) => "[OK]".to_string(),
        (false, false) => "[FAIL]".to_string(),
    }
}

pub fn verdict_label(verdict: Verdict, use_color: bool) -> String {
    let label = match verdict {
        Verdict::Approved => "Verified",
        Verdict::Rejected => "Not verified",
        Verdict::ApiError => "Verification error",
    };
    if !use_color {
        return label.to_string();
    }
    match verdict {
        Verdict::Approved => label.green().bold().to_string(),
        Verdict::Rejected => label.yellow().to_string(),
        Verdict::ApiError => label.red().to_string(),
    }
}

pub fn health_line(name: &str, status: &HealthStatus, use_color: bool) -> String {
    match status {
        HealthStatus::Healthy => format!("    {name:<9} {} healthy", marker(true, use_color)),
        HealthStatus::Degraded(reason) => {
            format!("    {name:<9} {} degraded: {reason}", marker(false, use_color))
        }
        HealthStatus::Unhealthy(reason) => {
            format!("    {name:<9} {} unhealthy: {reason}", marker(false, use_color))
        }
    }
}

/// Shortens `text` to `max` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
