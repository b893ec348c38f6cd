//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`], which turns runtime events into timestamped
//! operator log lines.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Coordinator / Worker ── publish(Event) ──► Bus ──► Probe listener ──► SubscriberSet
//!                                                                              │
//!                                                                    ┌─────────┴────────┐
//!                                                                    ▼                  ▼
//!                                                                LogWriter            Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use edgeprobe::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Alert;
//!
//! #[async_trait]
//! impl Subscribe for Alert {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::GraceExceeded {
//!             // page someone
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::{eprint_line, stamped, LogWriter};
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

pub(crate) use set::panic_message;
