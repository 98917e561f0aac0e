use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use support_window::config::AppConfig;
use support_window::extract::Extractor;
use support_window::logging;
use support_window::policy::DocumentPolicySource;
use support_window::report::{ReleaseSummary, render_release, render_report, support_report};
use support_window::source::GitHubSource;

#[derive(Parser)]
#[command(name = "support-window")]
#[command(version, about = "Decide which library releases are under maintenance")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the supported releases of every library in the organizations
    Scan {
        /// Organizations to scan
        #[arg(required = true)]
        orgs: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the release history of the library that contains a commit
    Lookup {
        /// Library (repository) name
        #[arg(long)]
        library: String,

        /// Commit the release points to
        #[arg(long)]
        commit: String,

        /// Organizations to search
        #[arg(required = true)]
        orgs: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let _guard = logging::init(&cli.log_level, cli.log_json)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    let token = std::env::var(&config.github.token_env).ok();
    let source = GitHubSource::from_config(&config.github, &config.fetch, token);
    let policies = DocumentPolicySource;
    let extractor = Extractor::new(&source, &policies, &config.support.variant_tag)
        .with_stagger_delay(Duration::from_millis(config.fetch.stagger_delay_ms));

    match command {
        Command::Scan { orgs, json } => {
            let registry = extractor.run_extraction(&orgs).await?;
            let report = support_report(&registry);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
        Command::Lookup {
            library,
            commit,
            orgs,
        } => {
            let registry = extractor.run_extraction(&orgs).await?;
            let releases = registry.releases_for_commit(&library, &commit);
            if releases.is_empty() {
                anyhow::bail!("No release of {} points to {}", library, commit);
            }
            for release in &releases {
                println!("{}", render_release(&ReleaseSummary::from(release)));
            }
        }
    }

    Ok(())
}
