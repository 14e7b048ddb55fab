//! SDK Regeneration CLI
//!
//! Runs a full regeneration from action inputs, or exercises the reconciler
//! and ledger on their own.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sdk_regen::{
    decide, ActionConfig, GitRepository, GithubReleases, ManagementMetadata, Pipeline,
    ReleaseLedger, SpeakeasyCli,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdk-regen")]
#[command(about = "Regenerate SDKs from an OpenAPI document and record releases")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline using INPUT_* / GITHUB_* environment variables
    Run,

    /// Decide the next SDK version from current and previous metadata
    Decide {
        /// Current generator version
        #[arg(long)]
        tool_version: String,
        /// Current OpenAPI document version
        #[arg(long, default_value = "")]
        doc_version: String,
        /// Current OpenAPI document checksum
        #[arg(long)]
        doc_checksum: String,
        /// SDK version recorded by the previous generation
        #[arg(long, default_value = "")]
        sdk_version: String,
        #[arg(long, default_value = "")]
        previous_tool_version: String,
        #[arg(long, default_value = "")]
        previous_doc_version: String,
        #[arg(long, default_value = "")]
        previous_doc_checksum: String,
    },

    /// Print the most recent ledger record as JSON
    LastRelease {
        /// Path to RELEASES.md
        #[arg(default_value = "RELEASES.md")]
        ledger: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        println!("::error title=failed::{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run => {
            let config = ActionConfig::load()?;
            init_tracing(config.debug);

            let generator = SpeakeasyCli::new(&config.speakeasy_path);
            let scm = GitRepository::github(
                &config.server_url,
                &config.repository,
                config.access_token.clone(),
                config.workspace.repo_dir(),
            );
            let publisher = GithubReleases::new(
                config.api_url.clone(),
                config.repository.clone(),
                config.access_token.clone(),
            );

            let summary = Pipeline::new(&config, &generator, &scm, &publisher).run()?;
            if summary.regenerated.is_empty() {
                println!("No SDKs regenerated");
            } else {
                println!("Regenerated: {}", summary.regenerated.join(", "));
                if let Some(commit) = &summary.commit {
                    println!("Commit: {}", commit);
                }
            }
            Ok(())
        }

        Commands::Decide {
            tool_version,
            doc_version,
            doc_checksum,
            sdk_version,
            previous_tool_version,
            previous_doc_version,
            previous_doc_checksum,
        } => {
            init_tracing(false);

            let current = ManagementMetadata::new(tool_version, doc_version, doc_checksum);
            let previous = ManagementMetadata::new(
                previous_tool_version,
                previous_doc_version,
                previous_doc_checksum,
            );

            if let Some(version) = decide(&current, &sdk_version, &previous)? {
                println!("{}", version);
            }
            Ok(())
        }

        Commands::LastRelease { ledger } => {
            init_tracing(false);

            let record = ReleaseLedger::new(&ledger).read_last()?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
    }
}
