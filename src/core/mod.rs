//! Runtime core: shutdown coordination and the polling loop.
//!
//! Internal modules:
//! - [`signal`]: the one-shot completion latch;
//! - [`sources`]: termination sources (Ctrl-C, Unix signals, closures);
//! - [`coordinator`]: idempotent shutdown requests and bounded waiting;
//! - [`runner`]: executes one run with timeout and event publishing;
//! - [`worker`]: repeats the operation on a fixed, interruptible cadence;
//! - [`probe`]: wires all of the above into one process.

mod coordinator;
mod probe;
mod runner;
mod signal;
mod sources;
mod worker;

pub use coordinator::{ShutdownCoordinator, ShutdownOutcome};
pub use probe::Probe;
pub use signal::CompletionSignal;
#[cfg(unix)]
pub use sources::UnixSignal;
pub use sources::{os_sources, CtrlC, SourceFn, TerminationSource};
pub use worker::PollingWorker;
