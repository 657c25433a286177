use std::time::Duration;

use anyhow::anyhow;
use log::warn;
use reqwest::{Client, ClientBuilder, StatusCode};

use crate::{
    config::ScrapingConfig, error::ChartId, ratelimit::RateLimiter,
    text_manipulators::get_chart_url,
};

/// Where chart pages come from. The HTTP client in production, fixtures in
/// tests.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_chart(&self, chart_id: ChartId) -> anyhow::Result<String>;
}

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

/// Failure of a single attempt, split by whether trying again can help.
enum Attempt {
    Transient(anyhow::Error),
    Fatal(anyhow::Error),
}

impl RequestClient {
    pub fn new(config: &ScrapingConfig) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let rate_limiter = RateLimiter::new(config.requests_per_second)?;
        Ok(Self {
            client,
            rate_limiter,
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay(),
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, Attempt> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() || e.is_request() {
                Attempt::Transient(e.into())
            } else {
                Attempt::Fatal(e.into())
            }
        })?;

        let status = response.status();
        if is_retryable_status(status) {
            return Err(Attempt::Transient(anyhow!("{url} returned {status}")));
        }
        if !status.is_success() {
            return Err(Attempt::Fatal(anyhow!("{url} returned {status}")));
        }

        response.text().await.map_err(|e| Attempt::Transient(e.into()))
    }

    pub async fn fetch_url_body(&self, url: &str) -> anyhow::Result<String> {
        let mut attempt = 0;
        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Transient(e)) if attempt >= self.max_retries => {
                    return Err(e.context(format!("gave up after {} attempts", attempt + 1)));
                }
                Err(Attempt::Transient(e)) => {
                    let delay = backoff_delay(self.retry_base_delay, attempt);
                    warn!("fetching {url} failed ({e:#}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl PageSource for RequestClient {
    async fn fetch_chart(&self, chart_id: ChartId) -> anyhow::Result<String> {
        self.fetch_url_body(&get_chart_url(&self.base_url, chart_id))
            .await
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// base, 2×base, 4×base, ... capped at 64×base.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1 << attempt.min(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
        assert_eq!(backoff_delay(base, 6), backoff_delay(base, 20));
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(RequestClient::new(&ScrapingConfig::default()).is_ok());
    }
}
