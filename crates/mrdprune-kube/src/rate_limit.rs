//! Token-bucket request limiter shared by all API calls

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Longest single sleep; the bucket is re-checked after each one
const MAX_WAIT: Duration = Duration::from_secs(60);

/// Token bucket: `burst` requests may go out at once, after which requests
/// are released at `qps` per second.
#[derive(Debug)]
pub struct RateLimiter {
    qps: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    /// Create a limiter with a full bucket
    ///
    /// `qps` must be positive and `burst` at least 1; `ConnectionConfig`
    /// validates both before a limiter is built.
    pub fn new(qps: f32, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            qps: f64::from(qps).max(f64::MIN_POSITIVE),
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                refilled_at: Instant::now(),
            }),
        }
    }

    /// Wait until a request may be sent
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                self.refill(&mut bucket);
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                self.wait_for(bucket.tokens)
            };
            tokio::time::sleep(wait).await;
        }
    }

    /// Time until the bucket holds a whole token, capped at `MAX_WAIT`
    fn wait_for(&self, tokens: f64) -> Duration {
        Duration::try_from_secs_f64((1.0 - tokens) / self.qps)
            .map_or(MAX_WAIT, |wait| wait.min(MAX_WAIT))
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.qps).min(self.burst);
        bucket.refilled_at = now;
    }
}
