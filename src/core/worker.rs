//! # PollingWorker: run an operation on a fixed cadence until told to stop.
//!
//! ## State machine
//! ```text
//! Idle ──► Invoking ──ok──────────► Waiting ──interval──► Invoking
//!             │                        │
//!             ├─ cancelled ──┐         └─ cancelled ──┐
//!             ├─ Canceled ───┼──────────────────────► Stopped
//!             └─ failure ────┘ (error returned)          │
//!                                                        └─► completion.set()
//! ```
//!
//! ## Rules
//! - At most one run in flight; runs are strictly sequential.
//! - The wait between runs is raced against the token, never a blind sleep.
//! - The run itself receives a child token and is trusted to honour it.
//! - Completion is signalled exactly once on every exit path, including panics
//!   and the task being aborted.

use std::{sync::Arc, time::Duration};

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{runner::run_once, signal::CompletionSignal},
    error::OperationError,
    events::{Bus, Event, EventKind},
    operations::Operation,
};

/// Sets the completion signal when dropped.
struct CompletionGuard(CompletionSignal);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.set();
    }
}

/// Repeats one [`Operation`] every `interval` until cancelled or failed.
pub struct PollingWorker<O: Operation + ?Sized> {
    op: Arc<O>,
    interval: Duration,
    timeout: Option<Duration>,
    bus: Bus,
}

impl<O: Operation + ?Sized> PollingWorker<O> {
    /// Creates a worker; `timeout` bounds each run (`None` = unbounded).
    pub fn new(op: Arc<O>, interval: Duration, timeout: Option<Duration>, bus: Bus) -> Self {
        Self {
            op,
            interval,
            timeout,
            bus,
        }
    }

    /// Runs until `token` is cancelled or the operation fails.
    ///
    /// Returns the number of runs started on a clean stop, or the failure.
    /// `completion` is set after the worker has fully stopped.
    pub async fn run(
        self,
        token: CancellationToken,
        completion: CompletionSignal,
    ) -> Result<u64, OperationError> {
        let guard = CompletionGuard(completion);
        let mut runs: u64 = 0;
        let res = self.drive(&token, &mut runs).await;

        self.bus.publish(
            Event::new(EventKind::WorkerStopped)
                .with_operation(self.op.name())
                .with_run(runs),
        );
        drop(guard);
        res.map(|()| runs)
    }

    async fn drive(&self, token: &CancellationToken, runs: &mut u64) -> Result<(), OperationError> {
        loop {
            if token.is_cancelled() {
                return Ok(());
            }

            *runs += 1;
            self.bus.publish(
                Event::new(EventKind::OperationStarting)
                    .with_operation(self.op.name())
                    .with_run(*runs),
            );
            match run_once(self.op.as_ref(), token, self.timeout, *runs, &self.bus).await {
                Ok(()) => {}
                Err(OperationError::Canceled) => return Ok(()),
                Err(e) => return Err(e),
            }
            if token.is_cancelled() {
                return Ok(());
            }

            self.bus.publish(
                Event::new(EventKind::WaitScheduled)
                    .with_operation(self.op.name())
                    .with_run(*runs)
                    .with_delay(self.interval),
            );
            let sleep = time::sleep(self.interval);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::OperationFn;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::Instant;

    fn counting_op(counter: Arc<AtomicU64>) -> Arc<dyn Operation> {
        OperationFn::arc("count", move |_ctx: CancellationToken| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), OperationError>(())
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn runs_every_interval_until_cancelled() {
        let counter = Arc::new(AtomicU64::new(0));
        let worker = PollingWorker::new(
            counting_op(counter.clone()),
            Duration::from_millis(10),
            None,
            Bus::new(64),
        );
        let token = CancellationToken::new();
        let completion = CompletionSignal::new();
        let handle = tokio::spawn(worker.run(token.clone(), completion.clone()));

        // Runs at t=0, 10, 20, 30, 40.
        time::sleep(Duration::from_millis(45)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert!(!completion.is_set());

        token.cancel();
        assert_eq!(handle.await.unwrap().unwrap(), 5);
        assert!(completion.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() {
        let counter = Arc::new(AtomicU64::new(0));
        let worker = PollingWorker::new(
            counting_op(counter.clone()),
            Duration::from_secs(60),
            None,
            Bus::new(64),
        );
        let token = CancellationToken::new();
        let completion = CompletionSignal::new();
        let handle = tokio::spawn(worker.run(token.clone(), completion.clone()));

        time::sleep(Duration::from_millis(25)).await;
        let cancelled_at = Instant::now();
        token.cancel();
        completion.wait().await;

        assert!(cancelled_at.elapsed() < Duration::from_millis(1));
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_never_invokes() {
        let counter = Arc::new(AtomicU64::new(0));
        let worker = PollingWorker::new(
            counting_op(counter.clone()),
            Duration::from_millis(10),
            None,
            Bus::new(8),
        );
        let token = CancellationToken::new();
        token.cancel();
        let completion = CompletionSignal::new();

        assert_eq!(worker.run(token, completion.clone()).await.unwrap(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(completion.is_set());
    }

    #[tokio::test]
    async fn cooperative_cancel_during_run_stops_cleanly() {
        let op = OperationFn::arc("long", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err::<(), _>(OperationError::Canceled)
        });
        let worker = PollingWorker::new(op, Duration::from_millis(10), None, Bus::new(8));
        let token = CancellationToken::new();
        let completion = CompletionSignal::new();
        let handle = tokio::spawn(worker.run(token.clone(), completion.clone()));

        tokio::task::yield_now().await;
        token.cancel();
        assert_eq!(handle.await.unwrap().unwrap(), 1);
        assert!(completion.is_set());
    }

    #[tokio::test]
    async fn failure_still_signals_completion() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let op = OperationFn::arc("broken", |_ctx: CancellationToken| async {
            Err::<(), _>(OperationError::failed("connection refused"))
        });
        let worker = PollingWorker::new(op, Duration::from_millis(10), None, bus);
        let completion = CompletionSignal::new();

        let err = worker
            .run(CancellationToken::new(), completion.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Failed { .. }));
        assert!(completion.is_set());

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::OperationStarting,
                EventKind::OperationFailed,
                EventKind::WorkerStopped
            ]
        );
    }

    #[tokio::test]
    async fn aborted_worker_still_signals_completion() {
        let op = OperationFn::arc("hang", |_ctx: CancellationToken| async {
            std::future::pending::<()>().await;
            Ok::<(), OperationError>(())
        });
        let worker = PollingWorker::new(op, Duration::from_millis(10), None, Bus::new(8));
        let completion = CompletionSignal::new();
        let handle = tokio::spawn(worker.run(CancellationToken::new(), completion.clone()));

        tokio::task::yield_now().await;
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(completion.is_set());
    }
}
