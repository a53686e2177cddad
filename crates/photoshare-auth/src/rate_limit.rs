//! Two-window rate limiting over an external counter store.
//!
//! Attempts are counted in fixed hourly and daily buckets keyed by
//! operation and client identifier. Exceeding either window yields one
//! undifferentiated "too many attempts" error; the response never reveals
//! which window tripped or any counter values.
//!
//! Counting is increment-then-check on the store's atomic increment, so
//! two racing attempts cannot both slip under the limit. Failed and
//! successful attempts count alike.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;

use crate::error::AuthError;

/// Atomic counter store. In production this is an external service
/// (e.g. a shared cache); the in-memory implementation below serves
/// tests and single-node deployments.
pub trait RateLimitStore: Send + Sync {
    /// Atomically increment the counter for `key`, creating it with the
    /// given time-to-live if absent, and return the new value.
    fn increment(&self, key: &str, ttl: Duration) -> impl Future<Output = u64> + Send;
}

/// In-process counter store guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    entries: Mutex<HashMap<String, (u64, Instant)>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn increment(&self, key: &str, ttl: Duration) -> u64 {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, (_, expires)| *expires > now);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| (0, now + ttl));
        entry.0 += 1;
        entry.0
    }
}

/// Window thresholds.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Max attempts per hour (default: 10).
    pub hourly_limit: u64,
    /// Max attempts per day (default: 50).
    pub daily_limit: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            hourly_limit: 10,
            daily_limit: 50,
        }
    }
}

/// Two-window limiter for sensitive operations (tenant-code attempts,
/// sign-ups).
pub struct RateLimiter<S: RateLimitStore> {
    store: S,
    config: RateLimitConfig,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(store: S, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Count one attempt for `identifier` against `operation` and deny if
    /// either window is now over its threshold.
    pub async fn check_and_count(
        &self,
        operation: &str,
        identifier: &str,
    ) -> Result<(), AuthError> {
        let now = Utc::now();
        let hourly_key = format!(
            "{operation}:hourly:{identifier}:{}",
            now.format("%Y%m%d%H")
        );
        let daily_key = format!("{operation}:daily:{identifier}:{}", now.format("%Y%m%d"));

        let hourly = self
            .store
            .increment(&hourly_key, Duration::from_secs(3_600))
            .await;
        let daily = self
            .store
            .increment(&daily_key, Duration::from_secs(86_400))
            .await;

        if hourly > self.config.hourly_limit || daily > self.config.daily_limit {
            tracing::warn!(
                target: "security",
                operation,
                identifier,
                "rate limit exceeded"
            );
            // One generic hint regardless of which window tripped.
            return Err(AuthError::RateLimited {
                retry_after_secs: 3_600,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(hourly: u64, daily: u64) -> RateLimiter<MemoryRateLimitStore> {
        RateLimiter::new(
            MemoryRateLimitStore::new(),
            RateLimitConfig {
                hourly_limit: hourly,
                daily_limit: daily,
            },
        )
    }

    #[tokio::test]
    async fn allows_up_to_hourly_limit() {
        let limiter = limiter(3, 100);
        for _ in 0..3 {
            limiter.check_and_count("join", "10.0.0.1").await.unwrap();
        }
        let err = limiter.check_and_count("join", "10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AuthError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn daily_window_trips_independently() {
        let limiter = limiter(100, 2);
        limiter.check_and_count("join", "10.0.0.2").await.unwrap();
        limiter.check_and_count("join", "10.0.0.2").await.unwrap();
        let err = limiter.check_and_count("join", "10.0.0.2").await.unwrap_err();
        // Same error shape as the hourly trip: nothing reveals the window.
        assert!(matches!(
            err,
            AuthError::RateLimited {
                retry_after_secs: 3_600
            }
        ));
    }

    #[tokio::test]
    async fn identifiers_are_isolated() {
        let limiter = limiter(1, 10);
        limiter.check_and_count("join", "a").await.unwrap();
        // A different client is unaffected.
        limiter.check_and_count("join", "b").await.unwrap();
    }

    #[tokio::test]
    async fn operations_are_isolated() {
        let limiter = limiter(1, 10);
        limiter.check_and_count("join", "a").await.unwrap();
        limiter.check_and_count("signup", "a").await.unwrap();
    }
}
