//! Clock abstraction for window timing.
//!
//! The aggregator never reads system time directly; it asks its clock.
//! Production wires in real time, tests and simulation wire in a virtual
//! clock that only moves when told to, so window boundaries and report
//! timestamps are fully controllable.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wall-clock timestamp in milliseconds since the UNIX epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct WindowTimestamp(pub u64);

impl WindowTimestamp {
    pub fn from_millis(ms: u64) -> Self {
        WindowTimestamp(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn saturating_sub(&self, other: WindowTimestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(other.0))
    }

    /// Time of day as `HH:MM:SS`, UTC.
    pub fn hhmmss(&self) -> String {
        let secs_of_day = (self.0 / 1000) % 86_400;
        format!(
            "{:02}:{:02}:{:02}",
            secs_of_day / 3600,
            (secs_of_day % 3600) / 60,
            secs_of_day % 60
        )
    }
}

impl std::ops::Add<Duration> for WindowTimestamp {
    type Output = WindowTimestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        WindowTimestamp(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

/// Source of time for the window layer.
///
/// Implementations:
/// - `ProductionClock`: real system time
/// - `SimulatedClock`: controlled virtual time for tests
pub trait WindowClock: Send + Sync + Clone + 'static {
    fn now(&self) -> WindowTimestamp;

    fn elapsed(&self, since: WindowTimestamp) -> Duration {
        self.now().saturating_sub(since)
    }
}

/// Real-time clock. Anchors an `Instant` at construction so `now()` is
/// monotonic even if the system clock steps.
#[derive(Clone)]
pub struct ProductionClock {
    start: Instant,
    start_millis: u64,
}

impl Default for ProductionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductionClock {
    pub fn new() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let start_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX_EPOCH")
            .as_millis() as u64;
        ProductionClock {
            start: Instant::now(),
            start_millis,
        }
    }
}

impl WindowClock for ProductionClock {
    fn now(&self) -> WindowTimestamp {
        let elapsed = self.start.elapsed().as_millis() as u64;
        WindowTimestamp(self.start_millis + elapsed)
    }
}

/// Virtual clock for deterministic tests.
///
/// Time only advances via `advance()` or `set()`. Clones share state, so a
/// test can hold one handle while the aggregator holds another.
#[derive(Clone)]
pub struct SimulatedClock {
    time_ms: Arc<AtomicU64>,
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SimulatedClock {
    pub fn new(start_ms: u64) -> Self {
        SimulatedClock {
            time_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.time_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time_ms: u64) {
        self.time_ms.store(time_ms, Ordering::SeqCst);
    }

    pub fn current_ms(&self) -> u64 {
        self.time_ms.load(Ordering::SeqCst)
    }
}

impl WindowClock for SimulatedClock {
    fn now(&self) -> WindowTimestamp {
        WindowTimestamp(self.time_ms.load(Ordering::SeqCst))
    }
}
