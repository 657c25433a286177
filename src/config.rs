use std::{path::PathBuf, time::Duration};

use anyhow::{Context, ensure};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{game::Mode, record::Profile};

pub const ENV_PREFIX: &str = "CHARTSCRAPE_";

/// What to do when a fetched page has no title or leaderboard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Log the chart and move on to the next id.
    Skip,
    /// Stop the whole run.
    Abort,
}

/// The env vars that tune scraping. All are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapingConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_profile")]
    pub score_profile: Profile,
    #[serde(default = "default_profile")]
    pub time_profile: Profile,
    #[serde(default = "default_on_parse_failure")]
    pub on_parse_failure: ParseFailurePolicy,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_base_url() -> String {
    "https://cyberscore.me.uk".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("chart-info")
}

fn default_profile() -> Profile {
    Profile::Platform
}

fn default_on_parse_failure() -> ParseFailurePolicy {
    ParseFailurePolicy::Skip
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_requests_per_second() -> u32 {
    2
}

fn default_concurrency() -> usize {
    1
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_dir: default_output_dir(),
            score_profile: default_profile(),
            time_profile: default_profile(),
            on_parse_failure: default_on_parse_failure(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            requests_per_second: default_requests_per_second(),
            concurrency: default_concurrency(),
        }
    }
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://"),
            "base url must be http(s): {}",
            self.base_url
        );
        ensure!(self.concurrency >= 1, "concurrency must be at least 1");
        ensure!(
            self.requests_per_second >= 1,
            "requests per second must be at least 1"
        );
        ensure!(
            self.request_timeout_secs >= 1,
            "request timeout must be at least 1 second"
        );
        Ok(())
    }

    /// Output profile is fixed per mode.
    pub fn profile_for(&self, mode: Mode) -> Profile {
        match mode {
            Mode::Score => self.score_profile,
            Mode::Time => self.time_profile,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> envy::Result<ScrapingConfig> {
        envy::prefixed(ENV_PREFIX).from_iter(
            pairs
                .iter()
                .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), v.to_string())),
        )
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.base_url, "https://cyberscore.me.uk");
        assert_eq!(config.output_dir, PathBuf::from("chart-info"));
        assert_eq!(config.on_parse_failure, ParseFailurePolicy::Skip);
        assert_eq!(config.concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn profiles_are_configured_per_mode() {
        let config =
            from_pairs(&[("SCORE_PROFILE", "rank"), ("ON_PARSE_FAILURE", "abort")]).unwrap();
        assert_eq!(config.profile_for(Mode::Score), Profile::Rank);
        assert_eq!(config.profile_for(Mode::Time), Profile::Platform);
        assert_eq!(config.on_parse_failure, ParseFailurePolicy::Abort);
    }

    #[test]
    fn unknown_profile_is_rejected() {
        assert!(from_pairs(&[("TIME_PROFILE", "both")]).is_err());
    }

    #[test]
    fn zero_concurrency_fails_validation() {
        let config = from_pairs(&[("CONCURRENCY", "0")]).unwrap();
        assert!(config.validate().is_err());
    }
}
