use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths::expand_tilde;

/// User-facing configuration after defaults are applied.
#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: String,
    pub log_file: PathBuf,
    pub empty_hint_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "fsh> ".to_string(),
            log_file: PathBuf::from("shell.log"),
            empty_hint_threshold: 20,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    log_file: Option<String>,
    #[serde(default)]
    empty_hint_threshold: Option<u32>,
}

pub fn default_config_path() -> Result<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", "fsh")
        .context("could not determine config directory")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// A missing file yields defaults; a malformed one is a startup error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(contents).context("failed to parse config TOML")?;
    let defaults = Config::default();

    Ok(Config {
        prompt: raw.prompt.unwrap_or(defaults.prompt),
        log_file: raw
            .log_file
            .map(|p| expand_tilde(&p))
            .unwrap_or(defaults.log_file),
        empty_hint_threshold: raw
            .empty_hint_threshold
            .unwrap_or(defaults.empty_hint_threshold),
    })
}
