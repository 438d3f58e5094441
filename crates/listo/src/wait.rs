//! Polling wait primitives.
//!
//! The wait loop itself lives on [`Selector`](crate::Selector); this module
//! holds the injectable pieces: the clock and sleep strategies, the options
//! builder, and the condition-object form used for driver-native conditions.

use std::fmt;
use std::time::{Duration, Instant};

use crate::driver::Driver;

/// Default timeout for polling waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (200ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Time source for polling deadlines.
///
/// Injectable so waits can be exercised with fake time.
pub trait Clock {
    /// A deadline `duration` from now
    fn later_by(&self, duration: Duration) -> Instant;

    /// Whether now is still before `deadline`
    fn is_now_before(&self, deadline: Instant) -> bool;
}

/// [`Clock`] over the system monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn later_by(&self, duration: Duration) -> Instant {
        Instant::now() + duration
    }

    fn is_now_before(&self, deadline: Instant) -> bool {
        Instant::now() < deadline
    }
}

/// A sleep that was cut short.
///
/// The polling loop swallows this and keeps polling; callers that need a hard
/// abort must supervise the wait from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sleep was interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// Sleep strategy used between polls
pub trait Sleeper {
    /// Block for `duration`, reporting whether the sleep was cut short
    fn sleep(&self, duration: Duration) -> Result<(), Interrupted>;
}

/// [`Sleeper`] that blocks the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSleeper;

impl Sleeper for SystemSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        std::thread::sleep(duration);
        Ok(())
    }
}

/// Options for polling waits
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as a Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Polling interval as a Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// An externally supplied wait condition.
///
/// Used by [`Selector::wait_for`](crate::Selector::wait_for), which delegates
/// the per-poll decision entirely to the condition. This is the interop seam
/// for driver-native condition types.
pub trait WaitCondition {
    /// Whether the condition is satisfied right now
    fn check(&self, driver: &mut dyn Driver) -> bool;

    /// Description for timeout diagnostics
    fn description(&self) -> String;
}

/// A function-based wait condition
pub struct FnCondition<F: Fn(&mut dyn Driver) -> bool> {
    func: F,
    description: String,
}

impl<F: Fn(&mut dyn Driver) -> bool> fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: Fn(&mut dyn Driver) -> bool> FnCondition<F> {
    /// Create a new function condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F: Fn(&mut dyn Driver) -> bool> WaitCondition for FnCondition<F> {
    fn check(&self, driver: &mut dyn Driver) -> bool {
        (self.func)(driver)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}
