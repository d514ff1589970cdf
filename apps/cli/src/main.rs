//! skillpack CLI: compile PDF or text documents into skill packs.
//!
//! Each pack is a folder plus an identical zip archive holding skill
//! pages, a routing index and a keyword-overlap dependency graph.

mod commands;
mod extract;

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
