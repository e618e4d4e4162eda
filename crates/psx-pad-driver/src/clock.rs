//! Time source trait so timing-sensitive code runs against a fake clock in
//! tests.

use std::time::{Duration, Instant};

/// Monotonic time source used for pacing, retry budgets and settle delays.
///
/// `now` takes `&mut self` so mock clocks can advance themselves on every
/// read, which keeps bounded busy-waits terminating under test.
pub trait Clock {
    /// Time elapsed since some fixed epoch.
    fn now(&mut self) -> Duration;

    /// Block for at least `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub mod mock {
    use super::Clock;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Simulated clock. Every read advances time by a fixed tick, so code
    /// that spins on `now()` always makes progress; `sleep` advances time
    /// without blocking.
    ///
    /// Clones share the same underlying time, letting a test keep a handle
    /// while the driver owns its own copy.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        time: Arc<Mutex<Duration>>,
        tick: Duration,
    }

    impl MockClock {
        pub fn new() -> Self {
            Self::with_tick(Duration::from_micros(5))
        }

        pub fn with_tick(tick: Duration) -> Self {
            Self {
                time: Arc::new(Mutex::new(Duration::ZERO)),
                tick,
            }
        }

        /// Total simulated time consumed so far. Does not advance the clock.
        pub fn elapsed(&self) -> Duration {
            *self.time.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for MockClock {
        fn now(&mut self) -> Duration {
            let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
            *time += self.tick;
            *time
        }

        fn sleep(&mut self, duration: Duration) {
            let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
            *time += duration;
        }
    }
}
