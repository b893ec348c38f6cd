//! # Runtime events emitted by the coordinator, the worker and the probe driver.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Shutdown events**: requests, waiting, finished vs. timed out
//! - **Worker events**: per-run lifecycle (starting, failed, timeout, wait)
//! - **Process events**: probe start/stop, termination source failures
//!
//! The [`Event`] struct carries metadata such as the timestamp, operation name,
//! run number and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use edgeprobe::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::OperationFailed)
//!     .with_operation("fetch-url")
//!     .with_reason("connection refused")
//!     .with_run(3);
//!
//! assert_eq!(ev.kind, EventKind::OperationFailed);
//! assert_eq!(ev.operation.as_deref(), Some("fetch-url"));
//! assert_eq!(ev.run, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Process events ===
    /// Probe process is starting.
    ///
    /// Sets: `operation` (probe name)
    ProbeStarting,

    /// Termination sources are armed.
    ///
    /// Sets: `reason` (comma-separated source names, may be empty)
    ListeningForShutdown,

    /// A termination source could not be registered or stopped delivering.
    ///
    /// Sets: `operation` (source name), `reason`
    SourceFailed,

    /// The listener fell behind the bus and lost events.
    ///
    /// Sets: `skipped`. Emitted by the listener itself, never published.
    EventsDropped,

    /// Last event of a run; subscribers are drained after it.
    ///
    /// Sets: `reason` (outcome label)
    ProbeStopped,

    // === Shutdown events ===
    /// The cancellation signal transitioned to requested.
    ShutdownRequested,

    /// The coordinator began waiting for the completion signal.
    ///
    /// Sets: `timeout_ms` (grace)
    AwaitingCompletion,

    /// Completion was signalled within the grace period.
    CleanupFinished,

    /// Grace period elapsed before completion was signalled.
    ///
    /// Sets: `timeout_ms` (grace)
    GraceExceeded,

    // === Worker events ===
    /// A run of the operation is starting.
    ///
    /// Sets: `operation`, `run` (1-based)
    OperationStarting,

    /// A run exceeded its per-run timeout (always followed by `OperationFailed`).
    ///
    /// Sets: `operation`, `run`, `timeout_ms`
    OperationTimedOut,

    /// A run failed for a reason other than cancellation.
    ///
    /// Sets: `operation`, `run`, `reason`
    OperationFailed,

    /// The worker is waiting before the next run.
    ///
    /// Sets: `operation`, `run` (last completed run), `delay_ms`
    WaitScheduled,

    /// Output produced by a run (response body, twin, progress).
    ///
    /// Sets: `operation`, `reason` (the text)
    OperationOutput,

    /// The worker reached its terminal state.
    ///
    /// Sets: `operation`, `run` (total runs started)
    WorkerStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the operation (or probe / source), if applicable.
    pub operation: Option<Arc<str>>,
    /// Run number (starting from 1).
    pub run: Option<u64>,
    /// Timeout or grace in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Delay before the next run in milliseconds.
    pub delay_ms: Option<u64>,
    /// Human-readable reason (errors, source names, outcome, output text).
    pub reason: Option<Arc<str>>,
    /// Number of events lost by a lagging listener.
    pub skipped: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            operation: None,
            run: None,
            timeout_ms: None,
            delay_ms: None,
            reason: None,
            skipped: None,
        }
    }

    /// Attaches an operation (or probe / source) name.
    #[inline]
    pub fn with_operation(mut self, name: impl Into<Arc<str>>) -> Self {
        self.operation = Some(name.into());
        self
    }

    /// Attaches a run number.
    #[inline]
    pub fn with_run(mut self, n: u64) -> Self {
        self.run = Some(n);
        self
    }

    /// Attaches a timeout or grace duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(millis(d));
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(millis(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the number of events lost.
    #[inline]
    pub fn with_skipped(mut self, n: u64) -> Self {
        self.skipped = Some(n);
        self
    }

    /// True for the event that closes a probe run.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::ProbeStopped)
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}
