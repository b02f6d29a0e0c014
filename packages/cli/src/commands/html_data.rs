use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use shade_definitions::{generate_html_data, RealFileSystem};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct HtmlDataArgs {
    /// Directory containing *.def.json files (overrides config)
    #[arg(short, long)]
    pub components: Option<PathBuf>,

    /// Output file (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn html_data(args: HtmlDataArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let components = args
        .components
        .map(|dir| cwd.join(dir))
        .unwrap_or_else(|| config.components_dir(cwd));
    let output = args
        .output
        .map(|file| cwd.join(file))
        .unwrap_or_else(|| config.out_path(cwd));

    println!("📄 {} HTML data", "Generating".green().bold());
    println!("   Components: {}", components.display());

    let data = generate_html_data(&RealFileSystem, &components, &output)?;

    for tag in &data.tags {
        println!(
            "   {} {} ({} attributes)",
            "✓".green(),
            tag.name,
            tag.attributes.len()
        );
    }
    println!();
    println!("✨ {} {}", "Written".green().bold(), output.display());

    Ok(())
}
