/// Runtime configuration
///
/// Built once by the CLI and handed to constructors. Nothing reads the
/// environment after that.

use crate::core::retry::RetryPolicy;
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_MODEL: &str = "sonar-pro";
pub const DEFAULT_REGION: &str = "Telangana, India";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ERROR_LOG: &str = "error_log.csv";

/// Allowed range for attempts per project
pub const MAX_ATTEMPTS_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Transport-level timeout per request; separate from the retry policy
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub initial_retry_delay: Duration,
    /// Pause between projects in a batch
    pub project_delay: Duration,
    /// Region named in the prompt
    pub region: String,
    pub output_dir: PathBuf,
    pub results_file: String,
    pub error_log_file: String,
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.initial_retry_delay)
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(&self.results_file)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join(&self.error_log_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 4096,
            request_timeout: Duration::from_secs(60),
            max_attempts: 3,
            initial_retry_delay: Duration::from_secs(5),
            project_delay: Duration::from_secs(1),
            region: DEFAULT_REGION.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            results_file: default_results_file(),
            error_log_file: DEFAULT_ERROR_LOG.to_string(),
        }
    }
}

/// `results_<YYYYmmdd_HHMMSS>.csv` for the current local time
pub fn default_results_file() -> String {
    format!("results_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}
