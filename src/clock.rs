// src/clock.rs - Monotonic time source for the stats tracker
use std::time::Instant;

/// Monotonic clock abstraction. Timestamps are seconds as f64 from an
/// arbitrary epoch; only differences are meaningful.
pub trait TimeSource: Send + Sync {
    fn monotonic(&self) -> f64;
}

/// Process-lifetime clock anchored at construction.
pub struct HostClock {
    origin: Instant,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for HostClock {
    fn monotonic(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_clock_is_monotonic() {
        let clock = HostClock::new();
        let first = clock.monotonic();
        let second = clock.monotonic();
        assert!(second >= first);
        assert!(first >= 0.0);
    }
}
