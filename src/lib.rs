//! # edgeprobe
//!
//! **edgeprobe** runs one diagnostic operation against an IoT hub (or any
//! HTTP endpoint) on a fixed cadence, and shuts down cleanly when the host asks
//! it to.
//!
//! The interesting part is the shutdown discipline: a termination request
//! (Ctrl-C, `SIGTERM`, `SIGQUIT` or a programmatic call) interrupts the
//! operation and the wait between runs, then waits a bounded grace period for
//! the worker to signal that it finished cleaning up.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌────────────┐ ┌────────────┐ ┌────────────┐
//!  │   CtrlC    │ │  SIGTERM   │ │  SIGQUIT   │   TerminationSource(s)
//!  └─────┬──────┘ └─────┬──────┘ └─────┬──────┘
//!        ▼              ▼              ▼
//! ┌───────────────────────────────────────────────────┐
//! │ ShutdownCoordinator                               │
//! │  - request_shutdown(): unset ─► requested (once)  │
//! │  - token(): child CancellationToken               │
//! │  - await_completion(grace) ─► ShutdownOutcome     │
//! └──────────┬──────────────────────────────▲─────────┘
//!            │ cancel                       │ CompletionSignal::set()
//!            ▼                              │ (on every exit path)
//! ┌───────────────────────────────────────────────────┐
//! │ PollingWorker                                     │
//! │  loop { run_once(op) ; wait(interval) }           │
//! │  both interruptible by the token                  │
//! └──────────┬────────────────────────────────────────┘
//!            │ publishes
//!            ▼
//! ┌───────────────────────────────────────────────────┐
//! │ Bus (broadcast) ─► SubscriberSet ─► LogWriter     │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Probe::run(op, sources)
//!   ├─► ProbeStarting, arm sources (ListeningForShutdown)
//!   ├─► spawn PollingWorker
//!   │     loop {
//!   │       ├─ token cancelled? ─► stop
//!   │       ├─ run += 1, run_once(op, timeout)
//!   │       │    ├─ Ok / Canceled ─► continue
//!   │       │    └─ Failed / Timeout ─► OperationFailed, stop with error
//!   │       └─ WaitScheduled, sleep(interval) or token cancelled
//!   │     }
//!   │     WorkerStopped, CompletionSignal::set()
//!   ├─► shutdown requested ─► await_completion(grace)
//!   │       ├─ CleanupFinished ─► Ok(Completed)
//!   │       └─ GraceExceeded   ─► abort worker, Ok(TimedOut)
//!   └─► ProbeStopped, drain subscribers
//! ```
//!
//! ## Features
//! | Area             | Description                                               | Key types / traits                          |
//! |------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Shutdown**     | Idempotent requests, bounded wait for cleanup.            | [`ShutdownCoordinator`], [`CompletionSignal`] |
//! | **Sources**      | OS signals and custom triggers.                           | [`TerminationSource`], [`SourceFn`]         |
//! | **Polling**      | Fixed-interval, cancellable repetition of one operation.  | [`PollingWorker`], [`Operation`]            |
//! | **Events**       | Lifecycle events fanned out to subscribers.               | [`Event`], [`Subscribe`], [`LogWriter`]     |
//! | **Hub**          | Connection strings and a minimal HTTPS hub client.        | [`ConnectionString`], [`HubClient`]         |
//! | **Probes**       | Ready-made operations.                                    | [`FetchUrl`], [`GetTwin`], [`SendEvent`]    |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use edgeprobe::{Config, OperationError, OperationFn, Probe, ShutdownOutcome, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         interval: Duration::from_millis(10),
//!         grace: Duration::from_secs(1),
//!         ..Config::default()
//!     };
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     let probe = Probe::new("tick", cfg, subs);
//!     let coordinator = probe.coordinator();
//!
//!     let op = OperationFn::arc("tick", move |_ctx: CancellationToken| {
//!         let coordinator = coordinator.clone();
//!         async move {
//!             // Stop after the first run.
//!             coordinator.request_shutdown();
//!             Ok::<(), OperationError>(())
//!         }
//!     });
//!
//!     let outcome = probe.run(op, Vec::new()).await?;
//!     assert_eq!(outcome, ShutdownOutcome::Completed);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod hub;
mod operations;
mod probes;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use config::Config;
#[cfg(unix)]
pub use core::UnixSignal;
pub use core::{
    os_sources, CompletionSignal, CtrlC, PollingWorker, Probe, ShutdownCoordinator,
    ShutdownOutcome, SourceFn, TerminationSource,
};
pub use error::{OperationError, ProbeError};
pub use events::{Bus, Event, EventKind};
pub use hub::{ConnectionString, HttpHubClient, HubClient, HubError, API_VERSION};
pub use operations::{Operation, OperationFn, OperationRef};
pub use probes::{FetchUrl, GetTwin, SendEvent, DEFAULT_URL};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
