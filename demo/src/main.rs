//! reCAPTCHA authorizer: offline demo CLI
//!
//! Replays the decision scenarios against the real policy engine, secret
//! resolver, and audit writer with a scripted verification service.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- allow
//!   cargo run -p demo -- missing-token
//!   RUST_LOG=captcha_authz=info cargo run -p demo -- run-all

mod scenarios;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use captcha_authz_contracts::error::AuthzResult;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Request-time reCAPTCHA authorizer demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "reCAPTCHA authorizer decision demo",
    long_about = "Runs authorizer scenarios offline, showing the token check, score\n\
                  threshold, action allow-list, and secret caching."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Scenario A: human score on an allowed action → Allow.
    Allow,
    /// Scenario B: score below threshold → Deny.
    LowScore,
    /// Scenario C: action outside the allow-list → Deny.
    UnlistedAction,
    /// Scenario D: no token header → Deny without calling the verifier.
    MissingToken,
    /// Scenario E: parameter-store secret read once across requests.
    CachedSecret,
    /// Print the JSON audit trail for an allowed and a denied request.
    AuditTrail,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=info to see the decision log lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    match run(cli.command).await {
        Ok(true) => {
            println!("All selected scenarios behaved as expected.");
        }
        Ok(false) => {
            eprintln!("At least one scenario produced an unexpected decision.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

async fn run(command: Command) -> AuthzResult<bool> {
    match command {
        Command::RunAll => run_all().await,
        Command::Allow => scenarios::allow_human().await,
        Command::LowScore => scenarios::deny_low_score().await,
        Command::UnlistedAction => scenarios::deny_unlisted_action().await,
        Command::MissingToken => scenarios::deny_missing_token().await,
        Command::CachedSecret => scenarios::cached_parameter().await,
        Command::AuditTrail => scenarios::audit_trail().await,
    }
}

async fn run_all() -> AuthzResult<bool> {
    let results = [
        scenarios::allow_human().await?,
        scenarios::deny_low_score().await?,
        scenarios::deny_unlisted_action().await?,
        scenarios::deny_missing_token().await?,
        scenarios::cached_parameter().await?,
    ];
    Ok(results.iter().all(|ok| *ok))
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("reCAPTCHA Request Authorizer");
    println!("Offline Decision Demo");
    println!("============================");
    println!();
    println!("Decision chain per request:");
    println!("  [1] Token header present, otherwise Deny without any upstream call");
    println!("  [2] Secret resolved once per process and cached");
    println!("  [3] Verification service reports success");
    println!("  [4] Score at or above the threshold (0.5)");
    println!("  [5] Action in the allow-list ([\"submit\"])");
    println!("  [6] One decision record written per request");
    println!();
}
