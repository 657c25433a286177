use anyhow::Context;
use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use std::{num::NonZeroU32, time::Duration};

// Never hammer the leaderboard faster than this, whatever the config says.
const MAX_REQ_PER_SEC: NonZeroU32 = nonzero!(10u32);
const MS_BETWEEN_REQ: Duration = Duration::from_millis(100);

type SpecificGovernorRateLimiter =
    GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub struct RateLimiter {
    req_per_sec: SpecificGovernorRateLimiter,
    ms_between_req: SpecificGovernorRateLimiter,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> anyhow::Result<Self> {
        let requests_per_second = NonZeroU32::new(requests_per_second)
            .context("requests per second must be at least 1")?
            .min(MAX_REQ_PER_SEC);

        // Limit to X total req/sec on average.
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(requests_per_second));

        // No two requests closer than Y ms.
        let ms_between_req = GovernorRateLimiter::direct(
            Quota::with_period(MS_BETWEEN_REQ).context("request spacing must be non-zero")?,
        );

        Ok(RateLimiter {
            req_per_sec,
            ms_between_req,
        })
    }

    pub async fn wait_until_ready(&self) {
        // Per-second quota first, then spacing, so a burst let through by the
        // quota still gets spread out.
        self.req_per_sec.until_ready().await;
        self.ms_between_req.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_is_rejected() {
        assert!(RateLimiter::new(0).is_err());
    }

    #[tokio::test]
    async fn first_request_is_not_delayed() {
        let limiter = RateLimiter::new(2).unwrap();
        let started = std::time::Instant::now();
        limiter.wait_until_ready().await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
