//! Per-client sliding-window admission control.
//!
//! Each client key owns an ordered list of admission timestamps from the trailing
//! window. Checks for one key are serialized by a single mutex, and no other lock or
//! I/O is held while it is taken.


use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::constants::RATE_WINDOW;

/// Sliding-window rate limiter keyed by client identifier.
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    window: Duration,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_window(RATE_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            enabled: true,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// A limiter that admits everything and records nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admits `key` if fewer than `limit` requests fall inside the window, and records it.
    pub fn is_allowed(&self, key: &str, limit: u32) -> bool {
        self.is_allowed_at(key, limit, Instant::now())
    }

    pub fn is_allowed_at(&self, key: &str, limit: u32, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        let mut windows = self.windows.lock();
        let timestamps = windows.entry(key.to_string()).or_default();
        purge(timestamps, now, self.window);

        if timestamps.len() >= limit as usize {
            debug!(key, limit, "Rate limit exceeded");
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Slots left for `key` in the current window. Purges like [`Self::is_allowed`].
    pub fn get_remaining(&self, key: &str, limit: u32) -> u32 {
        self.get_remaining_at(key, limit, Instant::now())
    }

    pub fn get_remaining_at(&self, key: &str, limit: u32, now: Instant) -> u32 {
        if !self.enabled {
            return limit;
        }

        let mut windows = self.windows.lock();
        let Some(timestamps) = windows.get_mut(key) else {
            return limit;
        };
        purge(timestamps, now, self.window);

        limit.saturating_sub(timestamps.len() as u32)
    }

    /// Number of client keys with recorded history.
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().len()
    }
}

fn purge(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = timestamps.front() {
        if now.saturating_duration_since(oldest) > window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}
