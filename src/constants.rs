//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Backend used when neither the config file nor the environment names one
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Environment override for the API base URL
pub const ENV_API_URL: &str = "TURFSCOUT_API_URL";

/// Environment override for the bearer token
pub const ENV_TOKEN: &str = "TURFSCOUT_TOKEN";

/// Directory under $HOME holding the config file
pub const CONFIG_DIR_NAME: &str = ".turfscout";

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Log file, written next to the working directory
pub const LOG_FILE_NAME: &str = "turfscout.log";

/// Per-request timeout enforced by the HTTP client
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request the next page once the selection is this close to the end
pub const PREFETCH_THRESHOLD: usize = 3;

/// Application name
pub const APP_NAME: &str = "TurfScout";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
