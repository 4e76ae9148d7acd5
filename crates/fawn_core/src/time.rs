#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonic source of "now", expressed as time since an arbitrary origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven time source. Clones share the same timeline.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    nanos: Arc<AtomicU64>,
}

impl ManualTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, seconds: f32) {
        self.advance(Duration::from_secs_f32(seconds));
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Free-running frame clock.
///
/// The clock starts on the first call to [`delta`](Self::delta), which
/// returns zero; every later call returns the time since the previous one.
/// Deltas are wall-clock based, so animation speed does not depend on the
/// frame rate.
#[derive(Debug)]
pub struct FrameClock<S: TimeSource = SystemTimeSource> {
    source: S,
    start_time: Option<Duration>,
    last_update: Duration,
    /// Number of deltas taken since the clock started
    pub frame_count: u64,
}

impl Default for FrameClock<SystemTimeSource> {
    fn default() -> Self {
        Self::new(SystemTimeSource::new())
    }
}

impl<S: TimeSource> FrameClock<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            start_time: None,
            last_update: Duration::ZERO,
            frame_count: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    /// Returns the time elapsed since the previous call.
    pub fn delta(&mut self) -> Duration {
        let now = self.source.now();
        let delta = match self.start_time {
            None => {
                self.start_time = Some(now);
                Duration::ZERO
            }
            // A misbehaving source must never yield a negative delta.
            Some(_) => now.saturating_sub(self.last_update),
        };
        self.last_update = now;
        self.frame_count += 1;
        delta
    }

    #[must_use]
    pub fn delta_seconds(&mut self) -> f32 {
        self.delta().as_secs_f32()
    }

    /// Total time since the clock started, zero if it has not started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map_or(Duration::ZERO, |start| self.source.now().saturating_sub(start))
    }
}
