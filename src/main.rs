use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use affinity::bluesky::client::PublicAtpClient;
use affinity::bluesky::posts::BlueskyTimeline;
use affinity::config::Config;
use affinity::insights::client::PersonalityInsightsClient;
use affinity::output::{report, terminal};
use affinity::personality::compare::KeyPolicy;
use affinity::personality::extract::{flatten, RawAnalysisTree};
use affinity::pipeline::compare::{compare_profiles, AccountProfile, AnalysisOrchestrator};

/// Affinity: find the personality traits two Bluesky accounts share.
///
/// Fetches each account's recent English posts, runs them through a
/// Personality Insights service, and reports the traits on which the two
/// accounts score most alike.
#[derive(Parser)]
#[command(name = "affinity", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two accounts and list their most similar traits
    Compare {
        /// First handle (e.g. alice.bsky.social)
        handle_a: String,

        /// Second handle
        handle_b: String,

        /// Number of traits to list (default: AFFINITY_TOP_N or 5)
        #[arg(long)]
        top: Option<usize>,

        /// What to do with traits only one account has: strict, intersect, fill:<score>
        #[arg(long)]
        policy: Option<KeyPolicy>,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Analyze a single account and show its trait profile
    Profile {
        /// The handle to analyze
        handle: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Flatten a saved analysis result (JSON file) without any network calls
    Inspect {
        /// Path to the saved analysis JSON
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compare two saved analysis results (JSON files) offline
    CompareFiles {
        file_a: PathBuf,

        file_b: PathBuf,

        /// Number of traits to list (default: AFFINITY_TOP_N or 5)
        #[arg(long)]
        top: Option<usize>,

        /// What to do with traits only one result has: strict, intersect, fill:<score>
        #[arg(long)]
        policy: Option<KeyPolicy>,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("affinity=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            handle_a,
            handle_b,
            top,
            policy,
            json,
        } => {
            let config = Config::load()?;
            let credentials = config.require_insights()?;
            let settings = config.compare_settings(policy);
            let key_policy = settings.key_policy;
            let top_n = top.unwrap_or(config.top_n);

            let timeline = BlueskyTimeline::new(PublicAtpClient::new(&config.public_api_url)?);
            let analyzer = PersonalityInsightsClient::new(&config.insights_url, credentials)?;
            let orchestrator = AnalysisOrchestrator::new(&timeline, &analyzer, settings);

            info!(policy = %key_policy, top_n, "Comparing accounts");

            let spinner = spinner(&format!("Analyzing @{handle_a} and @{handle_b}..."), json);
            let result = orchestrator
                .compare_accounts(&handle_a, &handle_b, top_n)
                .await;
            spinner.finish_and_clear();
            let comparison = result?;

            if json {
                println!(
                    "{}",
                    report::comparison_json(&comparison, key_policy, chrono::Utc::now())?
                );
            } else {
                terminal::display_profile(&comparison.first);
                terminal::display_profile(&comparison.second);
                terminal::display_comparison(&comparison);
            }
        }

        Commands::Profile { handle, json } => {
            let config = Config::load()?;
            let credentials = config.require_insights()?;

            let timeline = BlueskyTimeline::new(PublicAtpClient::new(&config.public_api_url)?);
            let analyzer = PersonalityInsightsClient::new(&config.insights_url, credentials)?;
            let orchestrator =
                AnalysisOrchestrator::new(&timeline, &analyzer, config.compare_settings(None));

            let spinner = spinner(&format!("Analyzing @{handle}..."), json);
            let result = orchestrator.analyze_account(&handle).await;
            spinner.finish_and_clear();
            let profile = result?;

            if json {
                println!("{}", report::profile_json(&profile, chrono::Utc::now())?);
            } else {
                terminal::display_profile(&profile);
            }
        }

        Commands::Inspect { file, json } => {
            let profile = load_saved_profile(&file)?;

            if json {
                println!("{}", report::profile_json(&profile, chrono::Utc::now())?);
            } else {
                println!(
                    "\n{}",
                    format!("=== Traits in {} ===", file.display()).bold()
                );
                terminal::display_traits(&profile.traits);
            }
        }

        Commands::CompareFiles {
            file_a,
            file_b,
            top,
            policy,
            json,
        } => {
            let config = Config::load()?;
            let key_policy = policy.unwrap_or(config.key_policy);
            let top_n = top.unwrap_or(config.top_n);

            let first = load_saved_profile(&file_a)?;
            let second = load_saved_profile(&file_b)?;
            let comparison = compare_profiles(first, second, key_policy, top_n)?;

            if json {
                println!(
                    "{}",
                    report::comparison_json(&comparison, key_policy, chrono::Utc::now())?
                );
            } else {
                terminal::display_comparison(&comparison);
            }
        }
    }

    Ok(())
}

/// Flatten a saved analysis document into a profile named after its file.
fn load_saved_profile(path: &Path) -> Result<AccountProfile> {
    let tree = RawAnalysisTree::from_path(path)?;
    let traits = flatten(&tree)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(AccountProfile {
        handle: name,
        posts_fetched: 0,
        posts_analyzed: 0,
        traits,
    })
}

/// A spinner for the network-bound steps; hidden when printing JSON.
fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
