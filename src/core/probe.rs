//! # Probe: wires the coordinator, the polling worker and event delivery.
//!
//! A [`Probe`] is one process worth of shutdown discipline around a single
//! [`Operation`].
//!
//! ## High-level architecture
//! ```text
//! run(op, sources):
//!   listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)   (until ProbeStopped)
//!             lagged by n      ─► SubscriberSet::emit(EventsDropped { n })
//!   coordinator.arm(sources)
//!   worker = spawn(PollingWorker::run(coordinator.token(), completion))
//!
//!   select (biased):
//!     coordinator.requested() ─► await_completion(cfg.grace)
//!                                   ├─ Completed → join worker, its result decides
//!                                   └─ TimedOut  → abort worker, Ok(TimedOut)
//!     worker exits first       ─► its result decides (failure path)
//!
//!   publish ProbeStopped ─► listener drains ─► SubscriberSet::shutdown()
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use edgeprobe::{os_sources, Config, LogWriter, OperationError, OperationFn, Probe, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config { interval: Duration::from_secs(5), ..Config::default() };
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let probe = Probe::new("heartbeat", cfg, subs);
//!
//!     let op = OperationFn::arc("heartbeat", |_ctx: CancellationToken| async {
//!         println!("still here");
//!         Ok::<(), OperationError>(())
//!     });
//!     probe.run(op, os_sources()?).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinError, JoinHandle};

use crate::config::Config;
use crate::core::coordinator::{ShutdownCoordinator, ShutdownOutcome};
use crate::core::sources::TerminationSource;
use crate::core::worker::PollingWorker;
use crate::error::{OperationError, ProbeError};
use crate::events::{Bus, Event, EventKind};
use crate::operations::Operation;
use crate::subscribers::{panic_message, Subscribe, SubscriberSet};

/// One probe process: a named operation, its config and its subscribers.
pub struct Probe {
    name: String,
    cfg: Config,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    coordinator: ShutdownCoordinator,
}

impl Probe {
    /// Creates a probe. Nothing runs until [`Probe::run`].
    pub fn new(
        name: impl Into<String>,
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let coordinator = ShutdownCoordinator::new(bus.clone());
        Self {
            name: name.into(),
            cfg,
            bus,
            subscribers,
            coordinator,
        }
    }

    /// Handle for requesting shutdown programmatically.
    pub fn coordinator(&self) -> ShutdownCoordinator {
        self.coordinator.clone()
    }

    /// The probe's event bus; operations publish their output here.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs `op` until shutdown is requested through one of `sources` (or the
    /// coordinator handle), or until the operation fails.
    ///
    /// Returns how the shutdown ended; a grace timeout is not an error.
    pub async fn run<O: Operation + ?Sized>(
        self,
        op: Arc<O>,
        sources: Vec<Box<dyn TerminationSource>>,
    ) -> Result<ShutdownOutcome, ProbeError> {
        let listener = self.subscriber_listener();
        self.bus
            .publish(Event::new(EventKind::ProbeStarting).with_operation(self.name.as_str()));
        self.coordinator.arm(sources);

        let name = op.name().to_string();
        let worker = PollingWorker::new(
            op,
            self.cfg.interval,
            self.cfg.invocation_timeout(),
            self.bus.clone(),
        );
        let handle = tokio::spawn(
            worker.run(self.coordinator.token(), self.coordinator.completion()),
        );

        let res = self.drive_shutdown(handle, &name).await;

        let label = match &res {
            Ok(outcome) => outcome.as_label(),
            Err(e) => e.as_label(),
        };
        self.bus
            .publish(Event::new(EventKind::ProbeStopped).with_reason(label));
        let _ = listener.await;
        res
    }

    /// Forwards bus events to the subscriber set until the terminal event.
    ///
    /// Falling behind the bus is reported to subscribers as `EventsDropped`.
    fn subscriber_listener(&self) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone());
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        set.emit(&ev);
                        if ev.is_terminal() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        set.emit(&Event::new(EventKind::EventsDropped).with_skipped(skipped));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        })
    }

    /// Waits for either a shutdown request or the worker exiting on its own.
    async fn drive_shutdown(
        &self,
        mut handle: JoinHandle<Result<u64, OperationError>>,
        name: &str,
    ) -> Result<ShutdownOutcome, ProbeError> {
        tokio::select! {
            biased;
            _ = self.coordinator.requested() => {
                match self.coordinator.await_completion(self.cfg.grace).await {
                    ShutdownOutcome::Completed => {
                        join_result(handle.await, name).map(|_| ShutdownOutcome::Completed)
                    }
                    ShutdownOutcome::TimedOut => {
                        handle.abort();
                        Ok(ShutdownOutcome::TimedOut)
                    }
                }
            }
            joined = &mut handle => {
                join_result(joined, name).map(|_| ShutdownOutcome::Completed)
            }
        }
    }
}

fn join_result(
    joined: Result<Result<u64, OperationError>, JoinError>,
    name: &str,
) -> Result<u64, ProbeError> {
    match joined {
        Ok(Ok(runs)) => Ok(runs),
        Ok(Err(source)) => Err(ProbeError::OperationFailed {
            operation: name.to_string(),
            source,
        }),
        Err(e) if e.is_panic() => Err(ProbeError::WorkerPanicked {
            reason: panic_message(e.into_panic().as_ref()),
        }),
        Err(_cancelled) => Err(ProbeError::WorkerPanicked {
            reason: "worker task was cancelled".to_string(),
        }),
    }
}
