use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use corkboard::{
    cli::{self, RootCommand},
    logging::init_logging,
};

#[derive(Parser, Debug)]
#[command(
    name = "corkboard",
    about = "Personal kanban boards in the terminal",
    long_about = "Organize work into boards of ordered categories and tasks, \
                  persisted locally and portable as JSON.",
    version = env!("CORKBOARD_BUILD_VERSION"),
    author
)]
struct Cli {
    /// Sqlite database file; defaults to the local data directory
    #[arg(long, global = true, value_name = "FILE")]
    data_file: Option<PathBuf>,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: RootCommand,
}

fn main() -> Result<()> {
    if let Err(err) = init_logging() {
        eprintln!("warning: failed to initialize logging: {err}");
    }

    let cli = Cli::parse();

    let store_path = match cli.data_file {
        Some(path) => path,
        None => default_store_path()?,
    };

    let code = cli::run(&store_path, cli.command, cli.json, cli.quiet);
    std::process::exit(code);
}

fn default_store_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("failed to determine local data directory"))?;
    Ok(data_dir.join("corkboard").join("boards.sqlite"))
}
