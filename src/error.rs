//! Error types used by the probe runtime and its operations.
//!
//! This module defines two main error enums:
//!
//! - [`OperationError`]: errors raised by a single operation invocation.
//! - [`ProbeError`]: errors a probe run surfaces to the process boundary.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//! A shutdown that outlives its grace period is **not** an error; it is reported
//! as [`ShutdownOutcome::TimedOut`](crate::ShutdownOutcome::TimedOut).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by one operation invocation.
///
/// [`OperationError::Canceled`] is the expected way to end a run during shutdown
/// and is absorbed by the worker. Every other variant is fatal: the worker stops,
/// signals completion and hands the error to the process boundary.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OperationError {
    /// The operation observed the cancellation signal and gave up.
    #[error("operation cancelled")]
    Canceled,

    /// The operation failed.
    #[error("operation failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The invocation exceeded the configured per-run timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },
}

impl OperationError {
    /// Shorthand for [`OperationError::Failed`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use edgeprobe::OperationError;
    ///
    /// let err = OperationError::failed("connection refused");
    /// assert_eq!(err.to_string(), "operation failed: connection refused");
    /// ```
    pub fn failed(error: impl std::fmt::Display) -> Self {
        OperationError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            OperationError::Canceled => "operation_canceled",
            OperationError::Failed { .. } => "operation_failed",
            OperationError::Timeout { .. } => "operation_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            OperationError::Canceled => "cancelled".to_string(),
            OperationError::Failed { error } => format!("error: {error}"),
            OperationError::Timeout { timeout } => format!("timeout: {timeout:?}"),
        }
    }

    /// True only for [`OperationError::Canceled`].
    ///
    /// ```
    /// use edgeprobe::OperationError;
    ///
    /// assert!(OperationError::Canceled.is_canceled());
    /// assert!(!OperationError::failed("boom").is_canceled());
    /// ```
    pub fn is_canceled(&self) -> bool {
        matches!(self, OperationError::Canceled)
    }
}

/// # Errors a probe run returns to the process.
///
/// Either of these should become a nonzero exit status.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The operation failed for a reason other than cancellation.
    #[error("operation '{operation}' failed: {source}")]
    OperationFailed {
        /// Name of the failed operation.
        operation: String,
        /// What went wrong.
        #[source]
        source: OperationError,
    },

    /// The worker task panicked.
    #[error("worker panicked: {reason}")]
    WorkerPanicked {
        /// Panic payload, if it was a string.
        reason: String,
    },
}

impl ProbeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use edgeprobe::{OperationError, ProbeError};
    ///
    /// let err = ProbeError::OperationFailed {
    ///     operation: "fetch-url".into(),
    ///     source: OperationError::failed("404"),
    /// };
    /// assert_eq!(err.as_label(), "probe_operation_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeError::OperationFailed { .. } => "probe_operation_failed",
            ProbeError::WorkerPanicked { .. } => "probe_worker_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ProbeError::OperationFailed { operation, source } => {
                format!("{operation}: {}", source.as_message())
            }
            ProbeError::WorkerPanicked { reason } => format!("worker panicked: {reason}"),
        }
    }
}
