//! # Concrete probe operations.
//!
//! Each probe is an [`Operation`](crate::Operation) that races its external call
//! against the run's cancellation token, so a shutdown never waits for a
//! network round trip:
//! - [`FetchUrl`]: GET a URL and print the body;
//! - [`GetTwin`]: fetch the device/module twin and print it as JSON;
//! - [`SendEvent`]: send one `Hello world!` event.
//!
//! Probes do not write to stdout themselves. What they have to say is published
//! as [`EventKind::OperationOutput`] on the probe's bus, so it reaches the log
//! in order with the lifecycle lines.

mod fetch_url;
mod send_event;
mod twin;

pub use fetch_url::{FetchUrl, DEFAULT_URL};
pub use send_event::SendEvent;
pub use twin::GetTwin;

use crate::events::{Bus, Event, EventKind};

fn output(bus: &Bus, operation: &str, text: impl Into<std::sync::Arc<str>>) {
    bus.publish(
        Event::new(EventKind::OperationOutput)
            .with_operation(operation)
            .with_reason(text),
    );
}

/// Texts of the `OperationOutput` events already queued on `rx`.
#[cfg(test)]
fn drain_output(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<String> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .filter(|ev| ev.kind == EventKind::OperationOutput)
        .filter_map(|ev| ev.reason.map(|r| r.to_string()))
        .collect()
}
