//! # Operation abstractions.
//!
//! This module provides the unit of work a probe repeats:
//! - [`Operation`] - trait for an async, cancellable operation
//! - [`OperationFn`] - closure-backed implementation
//! - [`OperationRef`] - shared reference to an operation (`Arc<dyn Operation>`)

mod operation;
mod operation_fn;

pub use operation::Operation;
pub use operation_fn::{OperationFn, OperationRef};
