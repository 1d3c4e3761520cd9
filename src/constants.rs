//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Name given to a record that has none
pub const DEFAULT_RECORD_NAME: &str = "Name";

/// Content of a freshly created session file
pub const EMPTY_SESSION: &str = "[]";

/// Required extension for session files
pub const SESSION_EXTENSION: &str = "json";

/// Directory under the home directory holding config and logs
pub const CONFIG_DIR_NAME: &str = ".postperson";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default log file name
pub const LOG_FILE_NAME: &str = "postperson.log";

/// Application name
pub const APP_NAME: &str = "PostPerson";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long a notification stays in the status bar
pub const NOTIFICATION_SECS: i64 = 3;

/// Key event poll interval of the UI loop
pub const UI_POLL_MS: u64 = 50;
