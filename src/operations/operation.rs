//! # Operation abstraction.
//!
//! An [`Operation`] receives a [`CancellationToken`] on every run and is trusted
//! to observe it: when the token fires it should abort promptly and return
//! [`OperationError::Canceled`]. The worker never force-drops a run in progress.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::OperationError;

/// # Asynchronous, cancellable unit of work.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use edgeprobe::{Operation, OperationError};
///
/// struct Ping;
///
/// #[async_trait]
/// impl Operation for Ping {
///     fn name(&self) -> &str { "ping" }
///
///     async fn perform(&self, ctx: CancellationToken) -> Result<(), OperationError> {
///         if ctx.is_cancelled() {
///             return Err(OperationError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Performs one run.
    ///
    /// The success value is ignored by the worker; output is the operation's business.
    async fn perform(&self, ctx: CancellationToken) -> Result<(), OperationError>;
}
