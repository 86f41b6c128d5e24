use std::path::PathBuf;

use crate::cli::Cli;
use crate::import::DEFAULT_MAX_UPLOAD;
use crate::render::MIN_WIDTH;

const DEFAULT_WIDTH: usize = 80;
const FALLBACK_SETTINGS_PATH: &str = "./runepub-settings.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub settings_path: PathBuf,
    pub max_upload: u64,
    pub width: usize,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    InvalidNumber { name: &'static str, value: String },
    WidthTooSmall(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "Invalid value for {}: '{}'. Expected a positive number", name, value)
            }
            ConfigError::WidthTooSmall(width) => {
                write!(f, "Width {} is too small, use at least {}", width, MIN_WIDTH)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Resolve options: command line, then environment (and `.env`), then defaults.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_args(cli, |name| std::env::var(name).ok())
    }

    fn from_args(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let settings_path = cli
            .settings
            .clone()
            .or_else(|| env("RUNEPUB_SETTINGS"))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_settings_path(env("HOME")));

        let max_size_mb = match cli.max_size_mb {
            Some(mb) => Some(mb),
            None => parse_env(&env, "RUNEPUB_MAX_SIZE_MB")?,
        };
        let max_upload = max_size_mb
            .map(|mb| mb.saturating_mul(1024 * 1024))
            .unwrap_or(DEFAULT_MAX_UPLOAD);

        let width = match cli.width {
            Some(w) => w,
            None => parse_env(&env, "RUNEPUB_WIDTH")?.unwrap_or(DEFAULT_WIDTH),
        };
        if width < MIN_WIDTH {
            return Err(ConfigError::WidthTooSmall(width));
        }

        Ok(Config {
            settings_path,
            max_upload,
            width,
        })
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

fn default_settings_path(home: Option<String>) -> PathBuf {
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home)
            .join(".config")
            .join("runepub")
            .join("settings.json"),
        _ => PathBuf::from(FALLBACK_SETTINGS_PATH),
    }
}
