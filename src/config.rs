//! Configuration types for webset-tools

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Remote API configuration (endpoint, credentials, transport)
///
/// Groups settings shared by the webset, search and research clients.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote search service (default: "https://api.exa.ai")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as the `x-api-key` header
    pub api_key: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Webset polling configuration
///
/// The populate loop polls on a fixed interval (no jitter, no exponential
/// backoff) until the webset reports the terminal status or the attempt
/// budget is exhausted. The defaults give roughly a five minute budget.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between poll ticks (default: 2 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub interval: Duration,

    /// Maximum number of poll attempts before giving up with an explicit
    /// timeout error (default: 150)
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_attempts: default_poll_max_attempts(),
        }
    }
}

/// Research task polling configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Delay between status checks (default: 5 seconds)
    #[serde(default = "default_research_interval", with = "duration_serde")]
    pub interval: Duration,

    /// Maximum number of status checks before giving up (default: 60,
    /// i.e. five minutes at the default interval)
    #[serde(default = "default_research_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            interval: default_research_interval(),
            max_attempts: default_research_max_attempts(),
        }
    }
}

/// Retry configuration for transient failures
///
/// Applies to one-shot API calls (web search). The webset populate loop is
/// deliberately not covered: its failure handling is tick-local skipping on
/// a fixed cadence, not retry-with-backoff.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file (default: "./webset-tools.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Main configuration for webset-tools
///
/// Fields are organized into logical sub-configs:
/// - [`api`](ApiConfig) — remote endpoint, credentials, request timeout
/// - [`polling`](PollingConfig) — webset populate loop cadence and budget
/// - [`research`](ResearchConfig) — research task polling cadence and budget
/// - [`retry`](RetryConfig) — backoff for one-shot API calls
/// - [`persistence`](PersistenceConfig) — document store location
///
/// The `api` fields are flattened for serialization; the polling, research,
/// retry and persistence groups keep their own keys since their field names
/// overlap (`interval`, `max_attempts`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Webset polling settings
    #[serde(default)]
    pub polling: PollingConfig,

    /// Research polling settings
    #[serde(default)]
    pub research: ResearchConfig,

    /// Retry settings for one-shot calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Data storage settings
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

fn default_base_url() -> String {
    "https://api.exa.ai".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_poll_max_attempts() -> u32 {
    150
}

fn default_research_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_research_max_attempts() -> u32 {
    60
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./webset-tools.db")
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_five_minute_poll_budget() {
        let config = Config::default();
        let budget = config.polling.interval * config.polling.max_attempts;
        assert_eq!(budget, Duration::from_secs(300));
    }

    #[test]
    fn deserializes_from_minimal_json() {
        let config: Config = serde_json::from_str(
            r#"{ "api_key": "test-key", "persistence": { "database_path": "/tmp/t.db" } }"#,
        )
        .unwrap();
        assert_eq!(config.api.api_key, "test-key");
        assert_eq!(config.api.base_url, "https://api.exa.ai");
        assert_eq!(config.polling.max_attempts, 150);
        assert_eq!(config.research.interval, Duration::from_secs(5));
    }

    #[test]
    fn duration_fields_round_trip_as_seconds() {
        let config = Config {
            api: ApiConfig {
                api_key: "k".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["request_timeout"], 30);
        assert_eq!(json["polling"]["interval"], 2);
    }
}
