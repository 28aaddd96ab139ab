use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("proposal-generator rate limit exhausted after waiting {waited_ms}ms")]
    LimitExceeded { waited_ms: u64 },
}

/// Capacity and refill settings for the bucket bounding `ProposalGenerator::propose`
/// calls; sourced from `EngineConfig::rate_limit_capacity`/`rate_limit_refill_per_sec` (§4.Q).
#[derive(Debug, Clone, Copy)]
pub struct RateLimiterConfig {
    pub capacity: u32,
    pub refill_per_sec: u32,
    /// Longest a caller will poll for a token before giving up.
    pub max_wait: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_per_sec: 5,
            max_wait: Duration::from_secs(5),
        }
    }
}

/// Lock-free token bucket: atomics only, no mutex on the hot path.
struct TokenBucket {
    capacity: u32,
    tokens: AtomicU32,
    refill_rate: u32,
    last_refill: AtomicU64,
}

impl TokenBucket {
    fn new(capacity: u32, refill_rate: u32) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            capacity,
            tokens: AtomicU32::new(capacity),
            refill_rate,
            last_refill: AtomicU64::new(now),
        }
    }

    fn refill(&self) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let last = self.last_refill.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);
        if elapsed == 0 {
            return;
        }
        let tokens_to_add = (elapsed as u32).saturating_mul(self.refill_rate);
        if tokens_to_add == 0 {
            return;
        }
        if self
            .last_refill
            .compare_exchange(last, now, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            self.tokens
                .fetch_update(Ordering::SeqCst, Ordering::Relaxed, |current| {
                    Some(std::cmp::min(current.saturating_add(tokens_to_add), self.capacity))
                })
                .ok();
        }
    }

    fn try_acquire(&self) -> bool {
        self.refill();
        self.tokens
            .fetch_update(Ordering::SeqCst, Ordering::Relaxed, |current| {
                if current > 0 {
                    Some(current - 1)
                } else {
                    None
                }
            })
            .is_ok()
    }

    fn remaining(&self) -> u32 {
        self.refill();
        self.tokens.load(Ordering::Relaxed)
    }
}

/// Bounds concurrent `ProposalGenerator::propose` calls for a run, independent of
/// the per-call timeout/retry policy (§5). Has no opinion on negotiation
/// semantics: a rejection here is handled by the caller exactly like a
/// proposal-generator timeout.
pub struct RateLimiter {
    bucket: TokenBucket,
    poll_interval: Duration,
    max_wait: Duration,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: TokenBucket::new(config.capacity, config.refill_per_sec),
            poll_interval: Duration::from_millis(50),
            max_wait: config.max_wait,
        }
    }

    pub fn try_acquire(&self) -> bool {
        self.bucket.try_acquire()
    }

    pub fn remaining(&self) -> u32 {
        self.bucket.remaining()
    }

    /// Polls for a token until one is available or `max_wait` elapses.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        let start = tokio::time::Instant::now();
        loop {
            if self.bucket.try_acquire() {
                return Ok(());
            }
            let waited = start.elapsed();
            if waited >= self.max_wait {
                warn!(waited_ms = waited.as_millis() as u64, "rate limiter exhausted");
                return Err(RateLimitError::LimitExceeded {
                    waited_ms: waited.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_starts_full_and_drains() {
        let bucket = TokenBucket::new(3, 1);
        assert_eq!(bucket.remaining(), 3);
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }

    #[tokio::test]
    async fn acquire_succeeds_when_capacity_available() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            capacity: 2,
            refill_per_sec: 1,
            max_wait: Duration::from_millis(200),
        });
        assert!(limiter.acquire().await.is_ok());
        assert!(limiter.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn acquire_times_out_when_exhausted() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            capacity: 1,
            refill_per_sec: 0,
            max_wait: Duration::from_millis(120),
        });
        assert!(limiter.acquire().await.is_ok());
        let result = limiter.acquire().await;
        assert!(result.is_err());
    }
}
