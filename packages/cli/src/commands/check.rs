use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use shade_definitions::{load_definitions, observed_count, RealFileSystem};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory containing *.def.json files (overrides config)
    pub components: Option<PathBuf>,

    /// List attributes and parts for valid definitions
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validate every definition. Returns the number of invalid ones.
pub fn check(args: CheckArgs, cwd: &Path) -> Result<usize> {
    let config = Config::load(cwd)?;
    let components = args
        .components
        .map(|dir| cwd.join(dir))
        .unwrap_or_else(|| config.components_dir(cwd));

    println!("🔍 {} definitions", "Checking".green().bold());
    println!("   Components: {}", components.display());
    println!();

    let files = load_definitions(&RealFileSystem, &components)?;
    let mut invalid = 0;

    for file in &files {
        match file.validate() {
            Ok(()) => {
                println!("{} {}", "✓".green(), file.definition.name);
                if file.stem() != file.definition.name {
                    println!(
                        "  {} file name '{}' does not match tag name",
                        "warning".yellow().bold(),
                        file.stem()
                    );
                }
                if args.verbose {
                    println!(
                        "  {} attributes ({} observed), {} parts",
                        file.definition.attributes.len(),
                        observed_count(&file.definition),
                        file.definition.part_data_attributes.len()
                    );
                }
            }
            Err(err) => {
                invalid += 1;
                println!("{} {}", "✗".red(), err);
            }
        }
    }

    println!();
    println!("   Definitions checked: {}", files.len());
    if invalid > 0 {
        println!("   {} {}", "Invalid:".red(), invalid);
    } else {
        println!("   {} No issues found!", "✓".green());
    }

    Ok(invalid)
}
