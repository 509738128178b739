use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use autorelease::config::{AutoreleaseConfig, DEFAULT_GITHUB_API_URL, GitHubSettings, RunMode};
use autorelease::error::ReleaseError;
use autorelease::release::generator::CommandGenerator;
use autorelease::release::github::GitHubClient;
use autorelease::release::pipeline::Pipeline;
use autorelease::release::prune::prune_recent_releases;
use autorelease::version::registries::build_fetcher;
use autorelease::version::types::{BumpType, LanguageSelection};
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autorelease")]
#[command(version, about = "Bump, tag, release and regenerate SDK packages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    release: ReleaseArgs,

    /// Log what would happen without creating, deleting or publishing anything
    #[arg(long, global = true, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    dry_run: bool,

    /// Optional JSON config file
    #[arg(long, global = true, env = "AUTORELEASE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    github: GitHubArgs,

    /// Default filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Delete the most recent releases and their tags
    Prune(PruneArgs),
}

#[derive(Args)]
struct ReleaseArgs {
    /// Bump applied to the latest published version
    #[arg(long, env = "BUMP_TYPE")]
    bump: Option<BumpType>,

    /// Language to release, or "all"
    #[arg(long, env = "LANGUAGE")]
    language: Option<LanguageSelection>,

    /// Release exactly this version; requires a single --language
    #[arg(long = "release-version", env = "VERSION")]
    release_version: Option<String>,
}

impl ReleaseArgs {
    fn run_mode(&self) -> Result<RunMode, ReleaseError> {
        RunMode::from_params(self.bump, self.language, self.release_version.as_deref())
    }
}

#[derive(Args)]
struct PruneArgs {
    /// Number of releases to delete
    #[arg(long, env = "N_VERSIONS")]
    count: usize,
}

#[derive(Args)]
struct GitHubArgs {
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    github_api_url: String,

    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[arg(long, global = true, env = "GITHUB_OWNER", default_value = "")]
    github_owner: String,

    #[arg(long, global = true, env = "GITHUB_REPO", default_value = "")]
    github_repo: String,

    /// Commit new tags point at; defaults to the repository HEAD
    #[arg(long, global = true, env = "GITHUB_SHA")]
    github_sha: Option<String>,
}

impl GitHubArgs {
    fn settings(&self) -> GitHubSettings {
        GitHubSettings {
            api_url: self.github_api_url.clone(),
            token: self.github_token.clone(),
            owner: self.github_owner.clone(),
            repo: self.github_repo.clone(),
            commit_sha: self.github_sha.clone().filter(|sha| !sha.is_empty()),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(level: &str, format: LogFormat) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    guard
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_level, cli.log_format);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.github.settings();
    settings.validate(cli.dry_run)?;
    let host = Arc::new(GitHubClient::new(&settings).context("Failed to build GitHub client")?);

    if cli.dry_run {
        info!("Dry run: nothing will be created, deleted or published");
    }

    match cli.command {
        Some(Command::Prune(args)) => {
            let releases = prune_recent_releases(host.as_ref(), args.count, cli.dry_run).await?;
            for release in releases {
                println!("{}", release.tag_name);
            }
        }
        None => {
            let mode = cli.release.run_mode()?;
            let config = AutoreleaseConfig::load(cli.config.as_deref())?;
            let fetcher = build_fetcher(&config).context("Failed to build HTTP client")?;
            let generator = Arc::new(CommandGenerator::new(&config.generator));

            let pipeline = Pipeline::new(fetcher, host, generator, settings.commit_sha, cli.dry_run);
            let outcome = pipeline.run_all(&mode).await?;
            // Published tags are reported even when a sibling language failed
            for record in &outcome.records {
                match &record.html_url {
                    Some(url) => println!("{} {}", record.tag_name, url),
                    None => println!("{}", record.tag_name),
                }
            }
            outcome.into_result()?;
        }
    }

    Ok(())
}
