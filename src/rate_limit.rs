//! Fixed-window rate limiting per client key.
//!
//! Counters live behind [`CounterStore`] so a shared backend can replace the
//! in-process map without touching the limiter. Check-and-increment is a
//! single store operation; the limiter never reads then writes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::types::{ClientKey, Error, RateLimitConfig, Result};

/// Counter state after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// Requests admitted in the current window.
    pub count: u32,
    pub reset_at: DateTime<Utc>,
    pub admitted: bool,
}

/// Storage for per-key window counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically start or continue the key's window and count one request
    /// if the window still has room.
    async fn hit(
        &self,
        key: &ClientKey,
        max_requests: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<WindowState>;

    /// Drop windows that ended at or before `now`. Returns how many were removed.
    async fn sweep(&self, now: DateTime<Utc>) -> Result<usize>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Process-local counter store.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    windows: Mutex<HashMap<ClientKey, Window>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn hit(
        &self,
        key: &ClientKey,
        max_requests: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<WindowState> {
        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key.clone()).or_insert(Window {
            count: 0,
            reset_at: now + window,
        });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
        }

        let admitted = entry.count < max_requests;
        if admitted {
            entry.count += 1;
        }

        Ok(WindowState {
            count: entry.count,
            reset_at: entry.reset_at,
            admitted,
        })
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| w.reset_at > now);
        Ok(before - windows.len())
    }
}

/// Outcome of a rate-limit check, mirrored into response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Window end, epoch milliseconds.
    pub reset_at: i64,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, at least 1.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> i64 {
        let millis = self.reset_at - now.timestamp_millis();
        ((millis + 999) / 1000).max(1)
    }
}

/// Per-client fixed-window limiter.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    max_requests: u32,
    window: Duration,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// Limiter backed by an [`InMemoryCounterStore`].
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        Self::with_store(Arc::new(InMemoryCounterStore::new()), config)
    }

    pub fn with_store(store: Arc<dyn CounterStore>, config: &RateLimitConfig) -> Result<Self> {
        if config.max_requests == 0 {
            return Err(Error::validation("rate_limit.max_requests must be at least 1"));
        }
        let window = Duration::from_std(config.window)
            .map_err(|e| Error::validation(format!("rate_limit.window out of range: {e}")))?;
        if window <= Duration::zero() {
            return Err(Error::validation("rate_limit.window must be positive"));
        }
        Ok(Self {
            store,
            max_requests: config.max_requests,
            window,
        })
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }

    /// Check the key against its window and consume one unit if allowed.
    pub async fn allow(&self, key: &ClientKey) -> Result<RateLimitDecision> {
        self.allow_at(key, Utc::now()).await
    }

    pub async fn allow_at(&self, key: &ClientKey, now: DateTime<Utc>) -> Result<RateLimitDecision> {
        let state = self
            .store
            .hit(key, self.max_requests, self.window, now)
            .await?;

        let decision = RateLimitDecision {
            allowed: state.admitted,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(state.count),
            reset_at: state.reset_at.timestamp_millis(),
        };

        if !decision.allowed {
            tracing::debug!(
                "rate_limited: key={}, limit={}, reset_at={}",
                key,
                decision.limit,
                decision.reset_at
            );
        }
        Ok(decision)
    }

    /// Remove expired windows.
    pub async fn sweep(&self) -> Result<usize> {
        self.store.sweep(Utc::now()).await
    }

    /// Sweep expired windows every `every` until `cancel` fires.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        every: std::time::Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("rate_limit_sweeper_stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        match limiter.sweep().await {
                            Ok(0) => {}
                            Ok(removed) => tracing::debug!("rate_limit_sweep: removed={}", removed),
                            Err(e) => tracing::error!("rate_limit_sweep_failed: {}", e),
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config(max_requests: u32, window_secs: u64) -> RateLimitConfig {
        RateLimitConfig {
            max_requests,
            window: std::time::Duration::from_secs(window_secs),
            ..RateLimitConfig::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_admits_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(&config(3, 60)).unwrap();
        let key = ClientKey::for_ip("10.0.0.1");

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.allow_at(&key, t0()).await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = limiter.allow_at(&key, t0() + Duration::seconds(30)).await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.reset_at, (t0() + Duration::seconds(60)).timestamp_millis());
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::new(&config(1, 60)).unwrap();
        let key = ClientKey::for_ip("10.0.0.2");

        assert!(limiter.allow_at(&key, t0()).await.unwrap().allowed);
        assert!(!limiter.allow_at(&key, t0() + Duration::seconds(59)).await.unwrap().allowed);

        let later = t0() + Duration::seconds(60);
        let decision = limiter.allow_at(&key, later).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.reset_at, (later + Duration::seconds(60)).timestamp_millis());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(&config(1, 60)).unwrap();
        let a = ClientKey::for_ip("a");
        let b = ClientKey::for_ip("b");
        assert!(limiter.allow_at(&a, t0()).await.unwrap().allowed);
        assert!(limiter.allow_at(&b, t0()).await.unwrap().allowed);
        assert!(!limiter.allow_at(&a, t0()).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_concurrent_checks_never_exceed_limit() {
        let limiter = Arc::new(RateLimiter::new(&config(10, 60)).unwrap());
        let key = ClientKey::for_ip("burst");

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let key = key.clone();
                tokio::spawn(async move { limiter.allow_at(&key, t0()).await.unwrap().allowed })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }

    #[tokio::test]
    async fn test_sweep_drops_expired_windows() {
        let store = InMemoryCounterStore::new();
        let window = Duration::seconds(10);
        store.hit(&ClientKey::for_ip("old"), 5, window, t0()).await.unwrap();
        store
            .hit(&ClientKey::for_ip("new"), 5, window, t0() + Duration::seconds(8))
            .await
            .unwrap();

        let removed = store.sweep(t0() + Duration::seconds(10)).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut store = MockCounterStore::new();
        store
            .expect_hit()
            .times(1)
            .returning(|_, _, _, _| Err(Error::internal("store unavailable")));

        let limiter = RateLimiter::with_store(Arc::new(store), &config(5, 60)).unwrap();
        let err = limiter.allow(&ClientKey::for_ip("x")).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn test_decision_built_from_store_state() {
        let mut store = MockCounterStore::new();
        store
            .expect_hit()
            .withf(|key, max, window, _| {
                key.as_str() == "ip:1.2.3.4" && *max == 5 && *window == Duration::seconds(60)
            })
            .returning(|_, _, _, now| {
                Ok(WindowState {
                    count: 4,
                    reset_at: now + Duration::seconds(60),
                    admitted: true,
                })
            });

        let limiter = RateLimiter::with_store(Arc::new(store), &config(5, 60)).unwrap();
        let decision = limiter.allow_at(&ClientKey::for_ip("1.2.3.4"), t0()).await.unwrap();
        assert_eq!(
            decision,
            RateLimitDecision {
                allowed: true,
                limit: 5,
                remaining: 1,
                reset_at: (t0() + Duration::seconds(60)).timestamp_millis(),
            }
        );
    }

    #[test]
    fn test_rejects_degenerate_config() {
        assert!(RateLimiter::new(&config(0, 60)).is_err());
        assert!(RateLimiter::new(&config(5, 0)).is_err());
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let decision = RateLimitDecision {
            allowed: false,
            limit: 1,
            remaining: 0,
            reset_at: t0().timestamp_millis() + 1500,
        };
        assert_eq!(decision.retry_after_secs(t0()), 2);
        assert_eq!(decision.retry_after_secs(t0() + Duration::seconds(5)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_cancel() {
        let limiter = Arc::new(RateLimiter::new(&config(5, 60)).unwrap());
        let cancel = CancellationToken::new();
        let handle = limiter.spawn_sweeper(std::time::Duration::from_secs(1), cancel.clone());
        tokio::time::advance(std::time::Duration::from_secs(3)).await;
        cancel.cancel();
        handle.await.unwrap();
    }
}
