//! Outbound token-bucket rate limiter.
//!
//! The writer task acquires one token per line before handing it to the
//! transport, so rate-limit backoff never stalls the reader.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::RateLimitConfig;

/// Token bucket gating outbound lines.
///
/// Bursts up to `capacity` lines pass immediately; once drained, the
/// bucket refills in full when the window elapses.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    window: Duration,
    tokens: u32,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket from the session's rate-limit configuration.
    ///
    /// A capacity of zero is treated as one: every line must consume a
    /// token, so the bucket can never be permanently empty.
    pub fn new(config: RateLimitConfig) -> Self {
        let capacity = config.messages_per_window.max(1);
        Self {
            capacity,
            window: config.window,
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    /// Consume one token, sleeping through the window when none remain.
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_refill) >= self.window {
            self.tokens = self.capacity;
            self.last_refill = now;
        }

        while self.tokens == 0 {
            let elapsed = Instant::now().duration_since(self.last_refill);
            let wait = self.window.saturating_sub(elapsed);
            tokio::time::sleep(wait).await;
            self.tokens = self.capacity;
            self.last_refill = Instant::now();
        }

        self.tokens -= 1;
    }
}
