// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ProofQuest - photo proof verification and submission client.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use proofquest::prove::ProveRequest;
use proofquest::{App, browse, output, prove, show_config, wallet};
use proofquest_agent::{Reconciliation, WalletEvent};
use proofquest_core::ProofQuestError;
use tokio::io::BufReader;

/// ProofQuest - photo proof verification and submission client.
#[derive(Parser, Debug)]
#[command(name = "proofquest", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with the configured Telegram identity.
    Login,
    /// List active challenges, newest first.
    Challenges,
    /// Show one challenge.
    Challenge {
        id: i64,
    },
    /// List your submissions.
    Submissions,
    /// Verify a photo against a challenge and optionally submit it.
    Prove {
        #[arg(long)]
        challenge: i64,
        #[arg(long)]
        image: PathBuf,
        /// Submit the proof if the AI approves it.
        #[arg(long)]
        submit: bool,
    },
    /// Link a wallet address to your account.
    LinkWallet {
        address: String,
    },
    /// Read connected wallet addresses from stdin and keep the account in sync.
    WatchWallet,
    /// Check backend and AI provider health.
    Health,
    /// Show platform totals.
    Stats,
    /// Show top users by submission count.
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => proofquest_config::load_and_validate_path(path),
        None => proofquest_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            proofquest_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.app.log_level);
    let use_color = output::use_color(cli.plain);

    if let Commands::Config = cli.command {
        return match show_config::render_config(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => report(&e),
        };
    }

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => return report(&e),
    };

    let result = run(&app, cli.command, use_color).await;
    app.shutdown().await;

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => report(&e),
    }
}

/// Runs one command. `Ok(false)` means it completed but did not reach its goal.
async fn run(app: &App, command: Commands, use_color: bool) -> Result<bool, ProofQuestError> {
    match command {
        Commands::Login => {
            let user = app.sign_in().await?;
            println!("Signed in as {} (telegram id {})", user.display_name(), user.telegram_id);
            if let Some(wallet) = &user.wallet_address {
                println!("Linked wallet: {wallet}");
            }
            Ok(true)
        }
        Commands::Challenges => browse::run_challenges(app).await.map(|()| true),
        Commands::Challenge { id } => browse::run_challenge(app, id, use_color).await.map(|()| true),
        Commands::Submissions => browse::run_submissions(app).await.map(|()| true),
        Commands::Prove {
            challenge,
            image,
            submit,
        } => {
            let request = ProveRequest {
                challenge_id: challenge,
                image,
                submit,
            };
            let report = prove::run_prove(app, &request).await?;
            prove::print_report(&report, use_color);
            Ok(report.succeeded(submit))
        }
        Commands::LinkWallet { address } => {
            let result = wallet::run_link_wallet(app, &address).await?;
            wallet::print_reconciliation(&result, use_color);
            Ok(!matches!(
                result,
                Reconciliation::NoWallet | Reconciliation::NoUser
            ))
        }
        Commands::WatchWallet => {
            let stdin = BufReader::new(tokio::io::stdin());
            let events = wallet::run_watch_wallet(app, stdin, use_color).await?;
            Ok(!events
                .iter()
                .any(|e| matches!(e, WalletEvent::Failed { .. })))
        }
        Commands::Health => browse::run_health(app, use_color).await,
        Commands::Stats => browse::run_stats(app).await.map(|()| true),
        Commands::Leaderboard { limit } => browse::run_leaderboard(app, limit).await.map(|()| true),
        Commands::Config => Ok(true),
    }
}

fn report(error: &ProofQuestError) -> ExitCode {
    eprintln!("proofquest: {error}");
    ExitCode::FAILURE
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("proofquest={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prove_arguments_parse() {
        let cli = Cli::try_parse_from([
            "proofquest",
            "--plain",
            "prove",
            "--challenge",
            "7",
            "--image",
            "shelf.jpg",
            "--submit",
        ])
        .unwrap();
        assert!(cli.plain);
        match cli.command {
            Commands::Prove {
                challenge,
                image,
                submit,
            } => {
                assert_eq!(challenge, 7);
                assert_eq!(image, PathBuf::from("shelf.jpg"));
                assert!(submit);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = proofquest_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.verification.max_attempts, 3);
    }
}
