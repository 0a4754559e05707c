//! Fixed-window rate limiting per bucket and client.
//!
//! Counters live in process memory only. Several instances each enforce
//! their own limits, so the effective ceiling is best-effort.

use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Table size above which stale windows are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// A category of rate-limited operation with its own ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Create,
    Update,
    Telemetry,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Create => "create",
            Bucket::Update => "update",
            Bucket::Telemetry => "telemetry",
        }
    }
}

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock [`Clock`] used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// [`Clock`] that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

/// Window length and per-bucket ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub window: Duration,
    pub create: u32,
    pub update: u32,
    pub telemetry: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            create: 20,
            update: 20,
            telemetry: 60,
        }
    }
}

impl RateLimits {
    pub fn ceiling(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Create => self.create,
            Bucket::Update => self.update,
            Bucket::Telemetry => self.telemetry,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counter table keyed by `(bucket, client)`.
pub struct RateLimiter {
    windows: DashMap<(Bucket, String), Window>,
    limits: RateLimits,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            limits,
            clock,
        }
    }

    pub fn limits(&self) -> &RateLimits {
        &self.limits
    }

    /// Counts one request and reports whether it is within the ceiling.
    ///
    /// A window older than the configured length is restarted.
    pub fn allow(&self, bucket: Bucket, client: &str) -> bool {
        let now = self.clock.now();
        let ceiling = self.limits.ceiling(bucket);

        let count = {
            let mut window = self
                .windows
                .entry((bucket, client.to_string()))
                .or_insert(Window {
                    started: now,
                    count: 0,
                });

            if now.saturating_duration_since(window.started) > self.limits.window {
                *window = Window {
                    started: now,
                    count: 0,
                };
            }

            window.count = window.count.saturating_add(1);
            window.count
        };

        if self.windows.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let allowed = count <= ceiling;
        if !allowed {
            metrics::counter!("rate_limited_total", "bucket" => bucket.as_str()).increment(1);
            tracing::warn!(bucket = bucket.as_str(), client, "Rate limit exceeded");
        }
        allowed
    }

    /// Number of tracked windows.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    fn prune(&self, now: Instant) {
        let window = self.limits.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) <= window);
        tracing::debug!(remaining = self.windows.len(), "Pruned rate limit table");
    }
}
