use anyhow::Result;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;

pub mod afdian_client;
pub mod signer;

pub use afdian_client::{AfdianClient, FetchOutcome, PageEnvelope, StopReason};
pub use signer::{PageParams, SignedRequest};

/// Retry schedule for a single page request.
///
/// The wait after failed attempt `n` is `backoff_unit * backoff_base^n` plus a
/// uniform jitter in `[0, max_jitter)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: f64,
    pub backoff_unit: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: 2.0,
            backoff_unit: Duration::from_millis(500),
            max_jitter: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the wait after `attempt` (1-based) failed
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.backoff_unit.as_secs_f64() * self.backoff_base.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Full wait after `attempt` failed, jitter included
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = if self.max_jitter.is_zero() {
            Duration::ZERO
        } else {
            self.max_jitter.mul_f64(rand::thread_rng().gen::<f64>())
        };
        self.base_delay(attempt).saturating_add(jitter)
    }
}

/// Source of raw sponsor and order list items.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SponsorSource {
    /// Every item the sponsor listing returns
    async fn fetch_profiles(&self) -> Result<Vec<Value>>;

    /// Every item the order listing returns
    async fn fetch_transactions(&self) -> Result<Vec<Value>>;
}
