//! gatecalc CLI: score a GATE response sheet against the official answer key.
//!
//! Reads the master answer key, the question paper (for the mark scheme) and
//! the candidate's response sheet, then prints the per-question breakdown and
//! totals.

mod commands;
mod render;

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
