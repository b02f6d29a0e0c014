use serde::{Deserialize, Serialize};
use shade_definitions::{DEFAULT_OUT_DIR, DEFAULT_OUT_FILE};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "shade.config.json";

/// Shade configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing `*.def.json` files
    #[serde(default = "default_components_dir")]
    pub components_dir: String,

    /// Directory the HTML data is written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default = "default_out_file")]
    pub out_file: String,
}

fn default_components_dir() -> String {
    "components".to_string()
}

fn default_out_dir() -> String {
    DEFAULT_OUT_DIR.to_string()
}

fn default_out_file() -> String {
    DEFAULT_OUT_FILE.to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            debug!(path = %config_path.display(), ?config, "Loaded configuration");
            Ok(config)
        } else {
            debug!("No {DEFAULT_CONFIG_NAME} found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn components_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.components_dir)
    }

    pub fn out_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir).join(&self.out_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            components_dir: default_components_dir(),
            out_dir: default_out_dir(),
            out_file: default_out_file(),
        }
    }
}
