//! AnswerScout CLI — question-guided website exploration.
//!
//! Takes a set of questions and a site root, explores the site page by
//! page guided by LLM relevance scoring, and reports the answers it finds
//! with high confidence.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
