mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, html_data, CheckArgs, HtmlDataArgs};
use tracing_subscriber::EnvFilter;

/// Shade CLI - tooling for part-based custom element definitions
#[derive(Parser, Debug)]
#[command(name = "shade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate editor HTML data from *.def.json files
    HtmlData(HtmlDataArgs),

    /// Validate *.def.json files
    Check(CheckArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::HtmlData(args) => html_data(args, &cwd),
        Command::Check(args) => {
            let invalid = check(args, &cwd)?;
            if invalid > 0 {
                anyhow::bail!("{invalid} invalid definition(s)");
            }
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
