use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::policy::{RateLimitPolicy, RateWindow};

const DEFAULT_SHARD_COUNT: usize = 16;
const DEFAULT_MAX_BUCKETS: usize = 10_000;

/// Request admitted; counters reflect the tightest window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
}

/// Request rejected by an exhausted window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRejection {
    pub limit: u32,
    pub retry_after: Duration,
}

impl RateLimitRejection {
    /// Whole seconds for the `Retry-After` header, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs.max(1)
        }
    }
}

#[derive(Debug, Clone)]
struct WindowCounter {
    count: u32,
    reset_at: Instant,
}

/// One counter per policy window.
#[derive(Debug, Clone)]
struct RateLimitBucket {
    counters: Vec<WindowCounter>,
}

impl RateLimitBucket {
    fn new(windows: &[RateWindow], now: Instant) -> Self {
        Self {
            counters: windows
                .iter()
                .map(|window| WindowCounter {
                    count: 0,
                    reset_at: now + window.period,
                })
                .collect(),
        }
    }

    /// Latest reset across all windows; after it the bucket carries no state.
    fn expires_at(&self) -> Option<Instant> {
        self.counters.iter().map(|c| c.reset_at).max()
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at().map_or(true, |at| at <= now)
    }

    fn check_and_increment(
        &mut self,
        windows: &[RateWindow],
        now: Instant,
    ) -> Result<RateLimitStatus, RateLimitRejection> {
        for (counter, window) in self.counters.iter_mut().zip(windows) {
            if now >= counter.reset_at {
                counter.count = 0;
                counter.reset_at = now + window.period;
            }
        }

        // Every exhausted window must reset before the request can pass.
        let blocked = self
            .counters
            .iter()
            .zip(windows)
            .filter(|(counter, window)| counter.count >= window.limit)
            .max_by_key(|(counter, _)| counter.reset_at);

        if let Some((counter, window)) = blocked {
            return Err(RateLimitRejection {
                limit: window.limit,
                retry_after: counter.reset_at.saturating_duration_since(now),
            });
        }

        for counter in &mut self.counters {
            counter.count += 1;
        }

        // No windows means nothing to enforce.
        Ok(self
            .counters
            .iter()
            .zip(windows)
            .map(|(counter, window)| RateLimitStatus {
                limit: window.limit,
                remaining: window.limit.saturating_sub(counter.count),
            })
            .min_by_key(|status| status.remaining)
            .unwrap_or(RateLimitStatus {
                limit: 0,
                remaining: 0,
            }))
    }
}

/// Sharded rate limiter to reduce lock contention
///
/// Buckets are keyed by `"{policy}:{identifier}"` and distributed across shards
/// by hash, so concurrent requests for different clients rarely share a lock.
#[derive(Clone)]
pub struct HttpRateLimiter {
    shards: Vec<Arc<Mutex<HashMap<String, RateLimitBucket>>>>,
    max_buckets: usize,
}

impl Default for HttpRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRateLimiter {
    /// Create a limiter with the default shard count (16 shards)
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT)
    }

    /// Create a limiter with a custom shard count (at least one)
    pub fn with_shards(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }

    /// Cap on buckets per shard before the oldest is evicted.
    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = max_buckets.max(1);
        self
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Count one request from `identifier` against `policy`.
    ///
    /// All windows are checked and incremented under the shard lock, so a
    /// rejected request consumes nothing.
    pub async fn check(
        &self,
        policy: &RateLimitPolicy,
        identifier: &str,
    ) -> Result<RateLimitStatus, RateLimitRejection> {
        let key = format!("{}:{}", policy.name(), identifier);
        let shard_index = self.shard_index(&key);
        let mut buckets = self.shards[shard_index].lock().await;
        let now = Instant::now();

        if buckets.len() >= self.max_buckets && !buckets.contains_key(&key) {
            buckets.retain(|_, bucket| !bucket.is_expired(now));

            if buckets.len() >= self.max_buckets {
                let oldest_key = buckets
                    .iter()
                    .min_by_key(|(_, bucket)| bucket.expires_at())
                    .map(|(k, _)| k.clone());

                if let Some(key_to_remove) = oldest_key {
                    buckets.remove(&key_to_remove);
                    tracing::debug!(
                        removed_key = %key_to_remove,
                        shard_index = shard_index,
                        remaining_buckets = buckets.len(),
                        "Evicted oldest rate limit bucket due to capacity limit"
                    );
                }
            }
        }

        let windows = policy.windows();
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| RateLimitBucket::new(windows, now));
        if bucket.counters.len() != windows.len() {
            *bucket = RateLimitBucket::new(windows, now);
        }

        bucket.check_and_increment(windows, now)
    }

    /// Drop buckets whose every window has elapsed.
    pub async fn cleanup_expired_buckets(&self) -> usize {
        let now = Instant::now();
        let mut total_cleaned = 0;

        for shard in &self.shards {
            let mut buckets = shard.lock().await;
            let before = buckets.len();
            buckets.retain(|_, bucket| !bucket.is_expired(now));
            total_cleaned += before - buckets.len();
        }

        if total_cleaned > 0 {
            tracing::debug!(
                buckets_cleaned = total_cleaned,
                "Cleaned up expired rate limit buckets across all shards"
            );
        }
        total_cleaned
    }

    /// Number of live buckets across all shards.
    pub async fn bucket_count(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.lock().await.len();
        }
        total
    }
}
