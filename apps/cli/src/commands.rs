//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::info;

use answerscout_explorer::Explorer;
use answerscout_oracle::{HttpFetcher, OpenAiClient};
use answerscout_shared::{
    AppConfig, ExploreConfig, QuestionSet, init_config, load_config, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// AnswerScout — answer questions by exploring a website.
#[derive(Parser)]
#[command(
    name = "answerscout",
    version,
    about = "Explore a website page by page and extract confident answers to your questions.",
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
    /// Explore a site and answer the given questions.
    Run {
        /// Path to a JSON file mapping question IDs to question text.
        questions: PathBuf,

        /// Site root URL to explore (overrides defaults.site_root).
        #[arg(short, long)]
        site: Option<String>,

        /// Maximum pages to explore per question.
        #[arg(long)]
        max_pages: Option<usize>,

        /// Print the answer map but skip the configured report endpoint.
        #[arg(long)]
        no_report: bool,

        /// Task identifier for the report (overrides report.task).
        #[arg(long)]
        task: Option<String>,
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
        0 => "answerscout=info",
        1 => "answerscout=debug",
        _ => "answerscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            questions,
            site,
            max_pages,
            no_report,
            task,
        } => {
            cmd_run(
                &questions,
                site.as_deref(),
                max_pages,
                no_report,
                task.as_deref(),
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_run(
    questions_path: &Path,
    site: Option<&str>,
    max_pages: Option<usize>,
    no_report: bool,
    task: Option<&str>,
) -> Result<()> {
    let config = load_config()?;
    let api_key = validate_api_key(&config)?;

    let questions = load_questions(questions_path)?;
    if questions.is_empty() {
        return Err(eyre!(
            "no questions found in '{}'",
            questions_path.display()
        ));
    }

    let mut explore_config = ExploreConfig::from_app(&config, site)?;
    if let Some(max) = max_pages {
        explore_config.max_pages_per_question = max;
    }

    let run_id = uuid::Uuid::now_v7();
    info!(
        %run_id,
        site = %explore_config.site_root,
        questions = questions.len(),
        max_pages = explore_config.max_pages_per_question,
        "starting exploration"
    );

    let oracle = Arc::new(OpenAiClient::new(
        &api_key,
        &config.openai.base_url,
        config.openai.chat_model.clone(),
        config.openai.embedding_model.clone(),
    )?);
    let fetcher = Arc::new(HttpFetcher::new()?);

    let explorer = Explorer::new(oracle.clone(), oracle, fetcher, explore_config);
    let answers = explorer.explore(&questions).await;

    println!("{}", serde_json::to_string_pretty(&answers)?);
    info!(
        answered = answers.len(),
        unanswered = questions.len() - answers.len(),
        "exploration finished"
    );

    if !no_report {
        if let Some(endpoint) = config.report.endpoint.as_deref() {
            submit_report(&config, endpoint, task, &answers).await?;
        }
    }

    Ok(())
}

/// Load the question set from a JSON object file: `{"01": "question?"}`.
fn load_questions(path: &Path) -> Result<QuestionSet> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| eyre!("cannot read questions file '{}': {e}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| eyre!("invalid questions file '{}': {e}", path.display()))
}

/// POST the final answer map to the configured report endpoint.
async fn submit_report(
    config: &AppConfig,
    endpoint: &str,
    task_override: Option<&str>,
    answers: &std::collections::BTreeMap<String, String>,
) -> Result<()> {
    let task = task_override
        .or(config.report.task.as_deref())
        .ok_or_else(|| eyre!("report endpoint configured but no task set; pass --task"))?;
    let api_key = std::env::var(&config.report.api_key_env)
        .map_err(|_| eyre!("report API key env var '{}' not set", config.report.api_key_env))?;

    let payload = serde_json::json!({
        "task": task,
        "apikey": api_key,
        "answer": answers,
    });

    info!(endpoint, task, "submitting report");
    let response = reqwest::Client::new()
        .post(endpoint)
        .json(&payload)
        .send()
        .await
        .map_err(|e| eyre!("report submission failed: {e}"))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(eyre!("report endpoint returned {status}: {body}"));
    }

    println!("Report accepted: {body}");
    Ok(())
}

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
