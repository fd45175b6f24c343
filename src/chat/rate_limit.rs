use std::collections::VecDeque;

use tokio::time::{Duration, Instant};

/// Sliding-window admission control for message sends.
///
/// The window boundary moves continuously with the clock, so a decision is
/// exact at any call time rather than only at bucket edges. Each limiter is
/// owned by one session; timestamps are never shared.
#[derive(Debug)]
pub struct RateLimiter {
    timestamps: VecDeque<Instant>,
    max_messages: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_messages: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_messages),
            max_messages,
            window,
        }
    }

    /// Admits or rejects one action at the current time.
    ///
    /// Expired timestamps are dropped first; on admission the current time
    /// is recorded. After any decision at most `max_messages` live
    /// timestamps remain.
    pub fn try_admit(&mut self) -> bool {
        let now = Instant::now();
        self.evict_expired(now);

        if self.timestamps.len() >= self.max_messages {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }

    /// Time until the next admission would succeed; zero while below
    /// capacity.
    pub fn remaining_cooldown(&mut self) -> Duration {
        let now = Instant::now();
        self.evict_expired(now);

        if self.timestamps.len() < self.max_messages {
            return Duration::ZERO;
        }
        match self.timestamps.front() {
            Some(oldest) => self.window.saturating_sub(now.duration_since(*oldest)),
            None => Duration::ZERO,
        }
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some(oldest) = self.timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}
