//! Bounded polling.
//!
//! Every wait in blockview is a synchronous loop: evaluate, and if the
//! condition is not met sleep one interval and evaluate again, until the
//! deadline. A wait that fails has always used the full window.

use std::convert::Infallible;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (4 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 4_000;

/// Default polling interval (200ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Shortest sleep between polls; a zero interval is raised to this
pub const MIN_POLL_INTERVAL_MS: u64 = 1;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with an explicit window and interval
    #[must_use]
    pub const fn from_millis(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
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

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration, never shorter than
    /// [`MIN_POLL_INTERVAL_MS`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        let ms = if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            MIN_POLL_INTERVAL_MS
        } else {
            self.poll_interval_ms
        };
        Duration::from_millis(ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the condition was met
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of evaluations performed
    pub attempts: usize,
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Polling loop driver
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in use
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `predicate` until it returns true or the window closes.
    ///
    /// The predicate is evaluated at least once, including when the timeout
    /// is zero, and once more at the deadline.
    pub fn until<F>(&self, mut predicate: F) -> WaitResult
    where
        F: FnMut() -> bool,
    {
        let outcome: Result<(Option<()>, WaitResult), Infallible> =
            self.poll(|| Ok(predicate().then_some(())));
        match outcome {
            Ok((_, result)) => result,
            Err(never) => match never {},
        }
    }

    /// Poll a fallible producer until it yields a value or the window closes.
    ///
    /// An `Err` from the producer aborts the wait immediately; only the
    /// absence of a value is retried.
    pub fn poll<T, E, F>(&self, mut produce: F) -> Result<(Option<T>, WaitResult), E>
    where
        F: FnMut() -> Result<Option<T>, E>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let interval = self.options.poll_interval();
        let mut attempts = 0;

        loop {
            attempts += 1;
            if let Some(value) = produce()? {
                let result = WaitResult {
                    success: true,
                    elapsed: start.elapsed(),
                    attempts,
                };
                return Ok((Some(value), result));
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                tracing::debug!(
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "polling window closed"
                );
                let result = WaitResult {
                    success: false,
                    elapsed,
                    attempts,
                };
                return Ok((None, result));
            }
            std::thread::sleep(interval.min(timeout - elapsed));
        }
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Wait for a condition with the default polling interval
pub fn wait_until<F>(predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    Waiter::new(WaitOptions::new().with_timeout(timeout_ms))
        .until(predicate)
        .success
}
