use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Windows kept before expired entries are swept
const SWEEP_THRESHOLD: usize = 1024;

/// Hard cap on tracked clients; the oldest window is evicted past it
const MAX_TRACKED: usize = 16 * SWEEP_THRESHOLD;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of one rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limited: bool,
    pub remaining: u32,
    pub reset_in: Duration,
}

/// Fixed-window limiter keyed by client (usually the IP).
///
/// A limited caller is rejected immediately; nothing is queued.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    max_tracked: usize,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_capacity(max_requests, window, MAX_TRACKED)
    }

    pub(crate) fn with_capacity(max_requests: u32, window: Duration, max_tracked: usize) -> Self {
        Self {
            max_requests,
            window,
            max_tracked: max_tracked.max(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request for `key` and report whether it is over the limit.
    /// Rejected requests do not consume quota.
    pub async fn check(&self, key: &str) -> RateLimitStatus {
        self.check_at(key, Instant::now()).await
    }

    pub(crate) async fn check_at(&self, key: &str, now: Instant) -> RateLimitStatus {
        let mut windows = self.windows.lock().await;

        if windows.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }
        if windows.len() >= self.max_tracked && !windows.contains_key(key) {
            let oldest = windows
                .iter()
                .min_by_key(|(_, w)| w.started)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                windows.remove(&oldest);
            }
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let reset_in = self.window.saturating_sub(now.duration_since(entry.started));
        if entry.count >= self.max_requests {
            return RateLimitStatus {
                limited: true,
                remaining: 0,
                reset_in,
            };
        }

        entry.count += 1;
        RateLimitStatus {
            limited: false,
            remaining: self.max_requests - entry.count,
            reset_in,
        }
    }
}
