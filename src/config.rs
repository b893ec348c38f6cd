//! # Probe runtime configuration.
//!
//! Provides [`Config`], the settings shared by the coordinator, the polling worker
//! and the event bus.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-run timeout (see [`Config::invocation_timeout`])
//! - `bus_capacity = 0` → clamped to 1 (see [`Config::bus_capacity_clamped`])

use std::time::Duration;

/// Configuration for one probe process.
///
/// ## Field semantics
/// - `interval`: pause between two successful runs of the operation
/// - `grace`: maximum wait for the worker to stop once shutdown is requested
/// - `timeout`: per-run ceiling (`0s` = none)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Wait between two successful runs.
    ///
    /// The wait is interrupted as soon as shutdown is requested.
    pub interval: Duration,

    /// Bounded grace period.
    ///
    /// When shutdown is requested the process waits at most `grace` for the
    /// worker to report completion, then exits regardless.
    pub grace: Duration,

    /// Per-run timeout.
    ///
    /// - `Duration::ZERO` = runs are not time-limited
    /// - `> 0` = a run exceeding it fails with `OperationError::Timeout`
    pub timeout: Duration,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the per-run timeout as an `Option`.
    #[inline]
    pub fn invocation_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `interval = 60s`
    /// - `grace = 60s`
    /// - `timeout = 0s` (no timeout)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            grace: Duration::from_secs(60),
            timeout: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}
