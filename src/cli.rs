//! Command-line surface
//!
//! Flags map onto `Config`; the API key is read from `PERPLEXITY_API_KEY`
//! when not passed explicitly.

use crate::config::{self, Config, MAX_ATTEMPTS_RANGE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "realty-scout")]
#[command(author, version, about = "Collect residential project facts into a CSV table", long_about = None)]
pub struct Cli {
    /// API key for the answering service
    #[arg(long, env = "PERPLEXITY_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Chat-completions endpoint
    #[arg(long, default_value = config::DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Model identifier
    #[arg(long, default_value = config::DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Region named in the question
    #[arg(long, default_value = config::DEFAULT_REGION, global = true)]
    pub region: String,

    /// Directory holding the results table and error log
    #[arg(long, default_value = config::DEFAULT_OUTPUT_DIR, global = true)]
    pub output_dir: PathBuf,

    /// Results file name (default: results_<timestamp>.csv)
    #[arg(long, global = true)]
    pub output_file: Option<String>,

    /// Error log file name
    #[arg(long, default_value = config::DEFAULT_ERROR_LOG, global = true)]
    pub error_log: String,

    /// Attempts per project before giving up
    #[arg(long, default_value_t = 3, value_parser = parse_attempts, global = true)]
    pub max_attempts: u32,

    /// Delay before the first retry, in seconds; doubles each retry
    #[arg(long, default_value_t = 5, global = true)]
    pub retry_delay_secs: u64,

    /// Pause between projects in a batch, in seconds
    #[arg(long, default_value_t = 1, global = true)]
    pub project_delay_secs: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Look up a single project
    Fetch {
        /// Project name
        name: String,
    },
    /// Look up several projects, from arguments and/or a file
    Batch(BatchArgs),
    /// Look up every name in the `Project Name` column of a CSV file
    Import {
        /// CSV file to read
        file: PathBuf,
        /// Process repeated names again instead of dropping them
        #[arg(long)]
        keep_duplicates: bool,
    },
    /// Print the results table
    Show,
    /// Print the error log
    Errors,
    /// Ask whether a value is a reasonable answer for a factor
    Validate {
        #[arg(long)]
        factor: String,
        #[arg(long)]
        value: String,
    },
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Project names
    pub names: Vec<String>,

    /// Text file with one project name per line
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// Process repeated names again instead of dropping them
    #[arg(long)]
    pub keep_duplicates: bool,
}

impl Cli {
    /// Get the effective configuration
    pub fn config(&self) -> Config {
        Config {
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            region: self.region.clone(),
            output_dir: self.output_dir.clone(),
            results_file: self
                .output_file
                .clone()
                .unwrap_or_else(config::default_results_file),
            error_log_file: self.error_log.clone(),
            max_attempts: self.max_attempts,
            initial_retry_delay: Duration::from_secs(self.retry_delay_secs),
            project_delay: Duration::from_secs(self.project_delay_secs),
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..Config::default()
        }
    }
}

fn parse_attempts(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if MAX_ATTEMPTS_RANGE.contains(&n) {
        Ok(n)
    } else {
        Err(format!(
            "must be between {} and {}",
            MAX_ATTEMPTS_RANGE.start(),
            MAX_ATTEMPTS_RANGE.end()
        ))
    }
}
