//! Client configuration from the environment

use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const LOG_FILE_NAME: &str = ".library-desk/client.log";

/// Settings read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, no trailing path required
    pub api_url: String,
    pub log_file: PathBuf,
    /// `None` means requests may wait indefinitely
    pub request_timeout: Option<Duration>,
    /// Values that were ignored. Logged once the subscriber is up.
    pub warnings: Vec<String>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; invalid values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = Vec::new();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = match non_empty("DESK_API_URL") {
            Some(raw) if Url::parse(raw.trim()).is_ok() => raw.trim().to_string(),
            Some(raw) => {
                warnings.push(format!(
                    "DESK_API_URL {raw:?} is not a valid URL, using {DEFAULT_API_URL}"
                ));
                DEFAULT_API_URL.to_string()
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let log_file = non_empty("DESK_LOG_FILE").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(LOG_FILE_NAME)
            },
            PathBuf::from,
        );

        let request_timeout = match non_empty("DESK_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    warnings.push(format!(
                        "DESK_REQUEST_TIMEOUT_SECS {raw:?} is not a number of seconds, ignoring"
                    ));
                    None
                }
            },
            None => None,
        };

        Self {
            api_url,
            log_file,
            request_timeout,
            warnings,
        }
    }
}
