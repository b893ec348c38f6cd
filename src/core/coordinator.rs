//! # ShutdownCoordinator: one idempotent path from "stop" to "stopped".
//!
//! The coordinator owns the cancellation signal (a [`CancellationToken`] plus a
//! transition flag) and the [`CompletionSignal`]. Termination sources are armed
//! against it; whichever fires first performs the single unset→requested
//! transition, every later request is a no-op.
//!
//! ## Shutdown path
//! ```text
//! source fires ──► request_shutdown()
//!                     ├─ completion already set?  → no-op
//!                     ├─ already requested?       → no-op
//!                     └─ publish ShutdownRequested, cancel token
//!
//! await_completion(grace)
//!     ├─ publish AwaitingCompletion
//!     ├─ completion within grace → publish CleanupFinished → Completed
//!     └─ grace elapsed           → publish GraceExceeded   → TimedOut
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::signal::CompletionSignal;
use crate::core::sources::TerminationSource;
use crate::events::{Bus, Event, EventKind};

/// Result of waiting for the worker to confirm it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Completion was signalled within the grace period.
    Completed,
    /// The grace period elapsed first.
    TimedOut,
}

impl ShutdownOutcome {
    /// `true` for [`ShutdownOutcome::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, ShutdownOutcome::Completed)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownOutcome::Completed => "shutdown_completed",
            ShutdownOutcome::TimedOut => "shutdown_timed_out",
        }
    }
}

struct Inner {
    token: CancellationToken,
    requested: AtomicBool,
    completion: CompletionSignal,
    bus: Bus,
}

/// Owns the cancellation and completion signals of one process.
///
/// Cheap to clone; all clones share the same signals.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

impl ShutdownCoordinator {
    /// Creates a coordinator publishing its transitions on `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                requested: AtomicBool::new(false),
                completion: CompletionSignal::new(),
                bus,
            }),
        }
    }

    /// A token cancelled when shutdown is requested.
    ///
    /// Returns a child token: cancelling it does not request shutdown.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.child_token()
    }

    /// The completion signal the worker sets once it has stopped.
    pub fn completion(&self) -> CompletionSignal {
        self.inner.completion.clone()
    }

    /// Whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Completes once shutdown has been requested.
    pub async fn requested(&self) {
        self.inner.token.cancelled().await
    }

    /// Requests shutdown.
    ///
    /// Safe to call concurrently and repeatedly. Returns `true` only for the call
    /// that performed the transition; calls made after completion was signalled
    /// never transition.
    pub fn request_shutdown(&self) -> bool {
        if self.inner.completion.is_set() {
            return false;
        }
        if self.inner.requested.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.inner
            .bus
            .publish(Event::new(EventKind::ShutdownRequested));
        self.inner.token.cancel();
        true
    }

    /// Waits up to `timeout` for the completion signal.
    pub async fn await_completion(&self, timeout: Duration) -> ShutdownOutcome {
        let bus = &self.inner.bus;
        bus.publish(Event::new(EventKind::AwaitingCompletion).with_timeout(timeout));

        if self.inner.completion.wait_timeout(timeout).await {
            bus.publish(Event::new(EventKind::CleanupFinished));
            ShutdownOutcome::Completed
        } else {
            bus.publish(Event::new(EventKind::GraceExceeded).with_timeout(timeout));
            ShutdownOutcome::TimedOut
        }
    }

    /// Subscribes [`request_shutdown`](Self::request_shutdown) to every source.
    ///
    /// Spawns one listener per source. A listener requests shutdown each time its
    /// source fires and exits once completion is signalled or the source fails.
    /// Zero sources is legal.
    pub fn arm(&self, sources: Vec<Box<dyn TerminationSource>>) {
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        let names = names.join(", ");

        for source in sources {
            tokio::spawn(self.clone().listen(source));
        }
        self.inner
            .bus
            .publish(Event::new(EventKind::ListeningForShutdown).with_reason(names));
    }

    async fn listen(self, mut source: Box<dyn TerminationSource>) {
        let completion = self.completion();
        loop {
            tokio::select! {
                biased;
                _ = completion.wait() => break,
                res = source.triggered() => match res {
                    Ok(()) => {
                        self.request_shutdown();
                    }
                    Err(e) => {
                        self.inner.bus.publish(
                            Event::new(EventKind::SourceFailed)
                                .with_operation(source.name())
                                .with_reason(e.to_string()),
                        );
                        break;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sources::SourceFn;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::{broadcast, Notify};

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_transition_once() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let coordinator = ShutdownCoordinator::new(bus);
        let token = coordinator.token();
        let wins = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let c = coordinator.clone();
            let wins = wins.clone();
            handles.push(tokio::spawn(async move {
                if c.request_shutdown() {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert!(token.is_cancelled());
        assert!(coordinator.is_requested());
        assert_eq!(drain(&mut rx), vec![EventKind::ShutdownRequested]);
    }

    #[tokio::test]
    async fn request_after_completion_is_a_noop() {
        let coordinator = ShutdownCoordinator::new(Bus::new(8));
        assert!(coordinator.completion().set());

        assert!(!coordinator.request_shutdown());
        assert!(!coordinator.is_requested());
        assert!(!coordinator.completion().set());
    }

    #[tokio::test]
    async fn cancelling_handed_out_token_does_not_request() {
        let coordinator = ShutdownCoordinator::new(Bus::new(8));
        coordinator.token().cancel();
        assert!(!coordinator.is_requested());
    }

    #[tokio::test(start_paused = true)]
    async fn await_completion_reports_outcome() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let coordinator = ShutdownCoordinator::new(bus);

        let outcome = coordinator.await_completion(Duration::from_millis(5)).await;
        assert_eq!(outcome, ShutdownOutcome::TimedOut);
        assert_eq!(
            drain(&mut rx),
            vec![EventKind::AwaitingCompletion, EventKind::GraceExceeded]
        );

        let completion = coordinator.completion();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            completion.set();
        });
        let outcome = coordinator.await_completion(Duration::from_secs(1)).await;
        assert!(outcome.is_completed());
        assert_eq!(
            drain(&mut rx),
            vec![EventKind::AwaitingCompletion, EventKind::CleanupFinished]
        );
    }

    #[tokio::test]
    async fn armed_source_firing_twice_transitions_once() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let coordinator = ShutdownCoordinator::new(bus);
        let notify = Arc::new(Notify::new());
        let fired = Arc::new(AtomicUsize::new(0));

        let (n, f) = (notify.clone(), fired.clone());
        coordinator.arm(vec![SourceFn::boxed("manual", move || {
            let (n, f) = (n.clone(), f.clone());
            async move {
                n.notified().await;
                f.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })]);

        notify.notify_one();
        coordinator.requested().await;
        notify.notify_one();
        while fired.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        coordinator.completion().set();

        let kinds = drain(&mut rx);
        assert_eq!(kinds[0], EventKind::ListeningForShutdown);
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == EventKind::ShutdownRequested)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn failing_source_does_not_disarm_others() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let coordinator = ShutdownCoordinator::new(bus);
        let notify = Arc::new(Notify::new());

        let n = notify.clone();
        coordinator.arm(vec![
            SourceFn::boxed("broken", || async {
                Err(std::io::Error::other("no such signal"))
            }),
            SourceFn::boxed("manual", move || {
                let n = n.clone();
                async move {
                    n.notified().await;
                    Ok(())
                }
            }),
        ]);

        let failed = loop {
            let ev = rx.recv().await.unwrap();
            if ev.kind == EventKind::SourceFailed {
                break ev;
            }
        };
        assert_eq!(failed.operation.as_deref(), Some("broken"));
        assert_eq!(failed.reason.as_deref(), Some("no such signal"));

        notify.notify_one();
        coordinator.requested().await;
        assert!(coordinator.is_requested());
    }

    #[tokio::test]
    async fn zero_sources_still_work_programmatically() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let coordinator = ShutdownCoordinator::new(bus);
        coordinator.arm(Vec::new());

        let listening = rx.recv().await.unwrap();
        assert_eq!(listening.kind, EventKind::ListeningForShutdown);
        assert_eq!(listening.reason.as_deref(), Some(""));
        assert!(coordinator.request_shutdown());
    }
}
