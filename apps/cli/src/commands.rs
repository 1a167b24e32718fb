//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use skillgap_core::pipeline::{
    AnalysisConfig, AnalysisDeps, AnalysisReport, ProgressReporter, run_analysis,
};
use skillgap_core::vocabulary::SkillVocabulary;
use skillgap_fetcher::Fetcher;
use skillgap_index::OllamaEmbedder;
use skillgap_llm::OllamaClient;
use skillgap_search::{JobSearch, TavilySearch};
use skillgap_shared::{AppConfig, init_config, load_config, search_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// skillgap — find the gap between your résumé and your target role.
#[derive(Parser)]
#[command(
    name = "skillgap",
    version,
    about = "Analyze a résumé against live job postings and generate a skills-gap report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze a résumé against live postings for a target role.
    Analyze {
        /// Path to the résumé as a plain-text file.
        resume: PathBuf,

        /// Target role, e.g. "Data Scientist".
        #[arg(short, long)]
        role: String,

        /// Write the report to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "skillgap=info",
        1 => "skillgap=debug",
        _ => "skillgap=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze { resume, role, out } => cmd_analyze(&resume, &role, out.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Analyze
// ---------------------------------------------------------------------------

async fn cmd_analyze(resume_path: &Path, role: &str, out: Option<&Path>) -> Result<()> {
    let config = load_config()?;

    let role = role.trim();
    if role.is_empty() {
        return Err(eyre!("role must not be empty"));
    }

    let resume_text = std::fs::read_to_string(resume_path)
        .map_err(|e| eyre!("cannot read résumé '{}': {e}", resume_path.display()))?;
    if resume_text.trim().is_empty() {
        return Err(eyre!("résumé '{}' is empty", resume_path.display()));
    }

    // Search is optional: without an API key the run proceeds on résumé
    // skills alone.
    let search = match search_api_key(&config) {
        Some(key) => Some(TavilySearch::new(&config.search.endpoint, key)?),
        None => {
            warn!(
                env = %config.search.api_key_env,
                "search API key not set, skipping job search"
            );
            None
        }
    };

    let fetcher = Fetcher::new()?;
    let embedder = OllamaEmbedder::new(
        config.ollama.resolved_base_url(),
        &config.ollama.embedding_model,
    )?;
    let generator = OllamaClient::new(
        config.ollama.resolved_base_url(),
        config.ollama.resolved_model(),
        config.ollama.temperature,
    )?;
    let vocabulary = SkillVocabulary::with_extra_patterns(&config.skills.extra_patterns);

    let analysis_config = AnalysisConfig::from_app_config(role, resume_text, &config);
    let deps = AnalysisDeps {
        search: search.as_ref().map(|s| s as &dyn JobSearch),
        fetcher: &fetcher,
        embedder: &embedder,
        generator: &generator,
        vocabulary: &vocabulary,
    };

    info!(role, resume = %resume_path.display(), "starting analysis");

    let reporter = CliProgress::new();
    let outcome = run_analysis(&analysis_config, &deps, &reporter).await;

    print_summary(&outcome);

    match out {
        Some(path) => {
            std::fs::write(path, &outcome.report)
                .map_err(|e| eyre!("cannot write report to '{}': {e}", path.display()))?;
            println!("  Report written to {}", path.display());
            println!();
        }
        None => {
            println!("{}", outcome.report);
        }
    }

    Ok(())
}

fn print_summary(outcome: &AnalysisReport) {
    println!();
    println!("  Analysis complete");
    println!("  Run:      {}", outcome.run_id);
    println!(
        "  Postings: {} fetched of {} found",
        outcome.postings_fetched, outcome.postings_found
    );
    println!("  Skills:   {}", outcome.skills.join(", "));
    println!("  Evidence: {} snippet(s)", outcome.evidence_count);
    if outcome.degraded {
        println!("  Mode:     degraded (pattern-only extraction)");
    }
    println!("  Time:     {:.1}s", outcome.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn posting_fetched(&self, label: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {label}"));
    }

    fn done(&self, _outcome: &AnalysisReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
