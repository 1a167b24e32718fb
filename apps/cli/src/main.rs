//! skillgap CLI — résumé skills-gap analysis against live job postings.
//!
//! Searches the job market for a target role, grounds the analysis in real
//! posting text, and generates a personalized gap report with a local LLM.

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
