// Token bucket limiting outbound lookups to a fixed quota per time window

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_MAX_RATE: u32 = 150;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Bursts up to `max_rate`, then sustains `max_rate` acquisitions per `window`.
///
/// The bucket starts full, so the first `max_rate` callers pass at once, then
/// it refills continuously at `max_rate / window`. The first window can
/// therefore admit close to twice `max_rate`. Callers queue on a fair
/// mutex and are served in arrival order, so no caller waits longer than one
/// window behind the callers queued ahead of it.
#[derive(Debug)]
pub struct RateLimiter {
    max_rate: u32,
    window: Duration,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// A zero rate or window is bumped to the smallest usable value.
    pub fn new(max_rate: u32, window: Duration) -> Self {
        let max_rate = max_rate.max(1);
        let window = window.max(Duration::from_millis(1));
        Self {
            max_rate,
            window,
            bucket: Mutex::new(Bucket {
                tokens: f64::from(max_rate),
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn max_rate(&self) -> u32 {
        self.max_rate
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Waits until a permit is available and takes it. Never fails.
    pub async fn acquire(&self) {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);

        if bucket.tokens < 1.0 {
            let wait = self.time_per_token().mul_f64(1.0 - bucket.tokens);
            debug!("Rate limit reached, waiting {:?} for a permit", wait);
            tokio::time::sleep(wait).await;
            self.refill(&mut bucket);
            // Float rounding can leave us a hair short after the sleep.
            bucket.tokens = bucket.tokens.max(1.0);
        }

        bucket.tokens -= 1.0;
    }

    /// Takes a permit only if one is free right now.
    pub fn try_acquire(&self) -> bool {
        let Ok(mut bucket) = self.bucket.try_lock() else {
            return false;
        };
        self.refill(&mut bucket);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_per_token(&self) -> Duration {
        self.window / self.max_rate
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill);
        let earned = elapsed.as_secs_f64() / self.window.as_secs_f64() * f64::from(self.max_rate);
        bucket.tokens = (bucket.tokens + earned).min(f64::from(self.max_rate));
        bucket.last_refill = now;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RATE, DEFAULT_WINDOW)
    }
}
