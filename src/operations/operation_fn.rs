//! # Closure-backed operation (`OperationFn`)
//!
//! [`OperationFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per run. If runs need shared state, capture an `Arc<...>`
//! explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use edgeprobe::{OperationFn, OperationRef, OperationError};
//!
//! let op: OperationRef = OperationFn::arc("tick", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(OperationError::Canceled);
//!     }
//!     Ok::<(), OperationError>(())
//! });
//!
//! assert_eq!(op.name(), "tick");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::OperationError;
use crate::operations::Operation;

/// Shared handle to an operation.
pub type OperationRef = Arc<dyn Operation>;

/// Function-backed operation.
#[derive(Debug)]
pub struct OperationFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> OperationFn<F> {
    /// Creates a new function-backed operation.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the operation and returns it behind an `Arc`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Operation for OperationFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), OperationError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn perform(&self, ctx: CancellationToken) -> Result<(), OperationError> {
        (self.f)(ctx).await
    }
}
