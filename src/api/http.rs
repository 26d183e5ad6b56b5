use anyhow::{Context, Result};
use rand::Rng;
use reqwest::{Method, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// How often and how patiently a request is resent.
///
/// Only reads are resent. Every write the workflow makes creates an object
/// (fork, tree, commit, ref, pull request), and a write that timed out or
/// came back 5xx may still have landed on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Up to three resends, doubling from one second.
    pub const READ: Self = Self {
        max_retries: 3,
        base_delay: Duration::from_secs(1),
    };

    /// A single attempt.
    pub const ONCE: Self = Self {
        max_retries: 0,
        base_delay: Duration::ZERO,
    };

    pub fn for_method(method: &Method) -> Self {
        if *method == Method::GET {
            Self::READ
        } else {
            Self::ONCE
        }
    }

    /// Backoff before resend number `attempt + 1`, with up to 25% jitter.
    fn delay(&self, attempt: u32) -> Duration {
        let backoff = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let max_jitter_ms = (backoff.as_millis() / 4).min(u128::from(u64::MAX)) as u64;
        if max_jitter_ms == 0 {
            return backoff;
        }
        backoff + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter_ms))
    }
}

/// Rate limiting, gateway hiccups and timeouts on the host side.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn is_transient_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Send a request, resending transient failures as `policy` allows.
///
/// Error statuses that are not resent come back as `Ok` so the caller can
/// report the response body.
pub(super) async fn send_with_retry(
    policy: RetryPolicy,
    mut make_request: impl FnMut() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response> {
    let mut attempt = 0;

    loop {
        let reason = match make_request().send().await {
            Ok(response) => {
                let status = response.status();
                if !is_transient_status(status) || attempt >= policy.max_retries {
                    return Ok(response);
                }
                let _ = response.bytes().await;
                format!("status {}", status)
            }
            Err(err) => {
                if !is_transient_error(&err) || attempt >= policy.max_retries {
                    return Err(anyhow::Error::new(err)).with_context(|| {
                        format!("HTTP request failed after {} attempt(s)", attempt + 1)
                    });
                }
                err.to_string()
            }
        };

        let delay = policy.delay(attempt);
        attempt += 1;
        debug!(
            "Request failed ({}); resending in {:?} ({}/{})",
            reason, delay, attempt, policy.max_retries
        );
        sleep(delay).await;
    }
}
