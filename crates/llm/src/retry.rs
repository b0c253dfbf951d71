use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use starter_common::{Result, StarterError};
use tracing::warn;

use crate::client::{LlmClient, LlmRequest, LlmResponse};

/// Backoff policy for transient LLM failures (rate limits and 5xx).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

const RETRYABLE_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "500",
    "502",
    "503",
    "504",
    "529",
    "overloaded",
    "internal server error",
    "bad gateway",
    "service unavailable",
    "gateway timeout",
];

pub struct RetryingClient<T: LlmClient> {
    inner: T,
    config: RetryConfig,
}

impl<T: LlmClient> RetryingClient<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    fn is_retryable(error: &StarterError) -> bool {
        match error {
            StarterError::Llm(msg) => {
                let lower = msg.to_lowercase();
                RETRYABLE_MARKERS.iter().any(|m| lower.contains(m))
            }
            _ => false,
        }
    }

    /// Seconds from a `Retry-After: N` fragment in the error text, as millis.
    fn parse_retry_after(error_msg: &str) -> Option<u64> {
        let lower = error_msg.to_lowercase();
        let pos = lower.find("retry-after")?;
        error_msg[pos..]
            .split_whitespace()
            .skip(1)
            .find_map(|word| {
                word.trim_matches(|c: char| !c.is_ascii_digit())
                    .parse::<u64>()
                    .ok()
            })
            .map(|secs| secs * 1000)
    }

    fn compute_delay(&self, attempt: u32) -> u64 {
        let base = self.config.initial_delay_ms as f64
            * self.config.backoff_multiplier.powi(attempt as i32);
        let jitter = (base * 0.1 * jitter_fraction(attempt)) as u64;
        (base as u64)
            .saturating_add(jitter)
            .min(self.config.max_delay_ms)
    }
}

/// Deterministic jitter in [0, 1) derived from the attempt number.
fn jitter_fraction(attempt: u32) -> f64 {
    let x = attempt.wrapping_mul(2_654_435_761);
    (x % 100) as f64 / 100.0
}

#[async_trait]
impl<T: LlmClient> LlmClient for RetryingClient<T> {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let mut attempt = 0;
        loop {
            let err = match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if attempt >= self.config.max_retries || !Self::is_retryable(&err) {
                return Err(err);
            }

            let delay = Self::parse_retry_after(&err.to_string())
                .map(|ms| ms.min(self.config.max_delay_ms))
                .unwrap_or_else(|| self.compute_delay(attempt));

            warn!(
                model = %self.inner.model_name(),
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                delay_ms = delay,
                error = %err,
                "Retrying LLM request"
            );

            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            attempt += 1;
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
