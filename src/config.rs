//! Runtime configuration: command line flags layered over an optional YAML
//! file in the user's config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME};
use crate::validators::validate_session_path;

/// Terminal HTTP client backed by a JSON session file
#[derive(Parser, Debug, Default)]
#[command(name = "postperson", version, about)]
pub struct Cli {
    /// Session file to open or create (must end in .json). Without it a
    /// prompt asks for one.
    pub session: Option<String>,

    /// Request timeout in seconds (default: no timeout)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Settings read from `config.yaml`
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub session: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
    pub log_file: PathBuf,
}

/// `~/.postperson`, or `./.postperson` when there is no home directory
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Read a config file. A missing file yields the defaults.
pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&content)
        .with_context(|| format!("parsing config file {}", path.display()))
}

impl Config {
    /// Resolve the configuration; command line flags win over the file.
    pub fn load(cli: Cli) -> Result<Self> {
        let file_path = cli
            .config
            .clone()
            .unwrap_or_else(|| config_dir().join(CONFIG_FILE_NAME));
        let file = read_file_config(&file_path)?;
        Self::merge(cli, file)
    }

    fn merge(cli: Cli, file: FileConfig) -> Result<Self> {
        let session = cli
            .session
            .as_deref()
            .map(|s| validate_session_path(s).map_err(|msg| anyhow!(msg)))
            .transpose()?;

        let request_timeout = cli
            .timeout
            .or(file.request_timeout_secs)
            .map(Duration::from_secs);

        let log_file = cli
            .log_file
            .or(file.log_file)
            .unwrap_or_else(|| config_dir().join(LOG_FILE_NAME));

        Ok(Config {
            session,
            request_timeout,
            log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = read_file_config(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "request_timeout_secs: 15\nlog_file: /tmp/pp.log\n").unwrap();

        let cfg = read_file_config(&path).unwrap();
        assert_eq!(cfg.request_timeout_secs, Some(15));
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/pp.log")));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "timeout: 3\n").unwrap();
        assert!(read_file_config(&path).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli {
            timeout: Some(2),
            ..Default::default()
        };
        let file = FileConfig {
            request_timeout_secs: Some(30),
            log_file: Some(PathBuf::from("from-file.log")),
        };
        let cfg = Config::merge(cli, file).unwrap();
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(2)));
        assert_eq!(cfg.log_file, PathBuf::from("from-file.log"));
        assert_eq!(cfg.session, None);
    }

    #[test]
    fn test_invalid_session_path_fails() {
        let cli = Cli::parse_from(["postperson", "requests.txt"]);
        let err = Config::merge(cli, FileConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "File path must end with .json");
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["postperson", "--timeout", "9", "api.json"]);
        assert_eq!(cli.session.as_deref(), Some("api.json"));
        assert_eq!(cli.timeout, Some(9));
    }
}
