//! conversation-starter: research a person and write a networking report.
//!
//! Usage:
//!   conversation-starter <PROFILE_URL> [--name N] [--current-work W] [--config FILE]
//!
//! The report goes to stdout and, unless `--no-save` is given, to
//! `reports/{slug}_{timestamp}.md`. Logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use starter_common::Target;
use starter_coordinator::{
    Coordinator, PipelineConfig, PipelineRequest, finalize_report, save_report,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "conversation-starter",
    version,
    about = "Research a professional profile and generate pointed questions and conversation starters"
)]
struct Cli {
    /// Profile URL of the person you are meeting
    profile_url: String,

    /// Full name of the person, to tell same-named people apart
    #[arg(long)]
    name: Option<String>,

    /// Current job title or company, e.g. "CTO at Acme"
    #[arg(long)]
    current_work: Option<String>,

    /// TOML config file
    #[arg(long, short, env = "STARTER_CONFIG")]
    config: Option<PathBuf>,

    /// Re-delegations to the researcher after a rejected critique
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Interests file (read for context, appended with new interests)
    #[arg(long)]
    interests: Option<PathBuf>,

    /// Directory for saved reports
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Model for the non-research roles
    #[arg(long)]
    model: Option<String>,

    /// Print the report without saving it
    #[arg(long)]
    no_save: bool,
}

impl Cli {
    fn target(&self) -> Target {
        Target::new(&self.profile_url)
            .with_name(self.name.as_deref())
            .with_current_work(self.current_work.as_deref())
    }

    fn load_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(max) = self.max_iterations {
            config.pipeline.max_iterations = max;
        }
        if let Some(path) = &self.interests {
            config.pipeline.interests_path = path.clone();
        }
        if let Some(dir) = &self.reports_dir {
            config.pipeline.reports_dir = dir.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Exits with status 2 on bad arguments.
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = cli.load_config()?;
    let credentials = config.resolve_credentials_from_env();
    info!(
        llm = credentials.llm,
        profile = credentials.profile,
        search = credentials.search,
        "Credentials resolved"
    );

    let target = cli.target();
    if target.profile_url.is_empty() {
        anyhow::bail!("profile URL must not be empty");
    }
    eprintln!("Target profile: {}", target.profile_url);
    if let Some(name) = &target.name {
        eprintln!("Name: {name}");
    }
    if let Some(work) = &target.current_work {
        eprintln!("Current work: {work}");
    }
    eprintln!(
        "Max critique iterations: {}",
        config.pipeline.max_iterations
    );

    let coordinator = Coordinator::from_config(&config)?;
    let outcome = coordinator.run(PipelineRequest::new(target.clone())).await?;

    let report = finalize_report(&outcome.report, outcome.critique);
    println!("{report}");

    if outcome.is_exhausted() {
        warn!(
            attempts = outcome.research_attempts,
            "Report produced without critique approval"
        );
        eprintln!(
            "Warning: research was not approved after {} attempts; the report may be incomplete.",
            outcome.research_attempts
        );
    }

    if cli.no_save {
        return Ok(());
    }
    if outcome.report.trim().is_empty() {
        warn!("Report is empty; nothing saved");
        return Ok(());
    }

    let reports_dir = config.pipeline.reports_dir.clone();
    let saved_at = chrono::Local::now();
    let path = tokio::task::spawn_blocking(move || {
        save_report(&reports_dir, &target, &report, saved_at)
    })
    .await??;
    eprintln!("Report saved to {}", path.display());

    Ok(())
}
