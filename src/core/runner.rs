//! # Run a single invocation of an operation.
//!
//! - **Execute ONE run** of the operation with a child cancellation token
//! - **Apply timeout** if configured (wraps execution in `tokio::time::timeout`)
//! - **Publish events** for failures (cancellation is silent)
//!
//! ## Event flow
//! ```text
//! Success:
//!   perform() → Ok(())         → (nothing)
//!
//! Cancellation:
//!   perform() → Err(Canceled)  → (nothing)
//!
//! Failure:
//!   perform() → Err(Failed)    → publish OperationFailed
//!
//! Timeout:
//!   timeout exceeded → cancel child → publish OperationTimedOut
//!                                   → publish OperationFailed
//! ```
//!
//! The run is **not** raced against the parent token: cancellation is
//! cooperative and the operation decides how fast it honours it.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    error::OperationError,
    events::{Bus, Event, EventKind},
    operations::Operation,
};

/// Executes one run of `op`, publishing failure events to `bus`.
pub async fn run_once<O: Operation + ?Sized>(
    op: &O,
    parent: &CancellationToken,
    timeout: Option<Duration>,
    run: u64,
    bus: &Bus,
) -> Result<(), OperationError> {
    let child = parent.child_token();

    let res = if let Some(dur) = timeout.filter(|d| *d > Duration::ZERO) {
        match time::timeout(dur, op.perform(child.clone())).await {
            Ok(r) => r,
            Err(_elapsed) => {
                child.cancel();
                bus.publish(
                    Event::new(EventKind::OperationTimedOut)
                        .with_operation(op.name())
                        .with_run(run)
                        .with_timeout(dur),
                );
                Err(OperationError::Timeout { timeout: dur })
            }
        }
    } else {
        op.perform(child.clone()).await
    };

    match res {
        Ok(()) => Ok(()),
        Err(OperationError::Canceled) => Err(OperationError::Canceled),
        Err(e) => {
            bus.publish(
                Event::new(EventKind::OperationFailed)
                    .with_operation(op.name())
                    .with_run(run)
                    .with_reason(e.to_string()),
            );
            Err(e)
        }
    }
}
