//! # SendEvent: can we publish telemetry?

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::output;
use crate::error::OperationError;
use crate::events::Bus;
use crate::hub::HubClient;
use crate::operations::Operation;

/// Sends one `"<utc timestamp> Hello world!"` event per run.
pub struct SendEvent<C: HubClient + ?Sized> {
    client: Arc<C>,
    bus: Bus,
}

impl<C: HubClient + ?Sized> SendEvent<C> {
    /// Creates the operation; output goes to `bus`.
    pub fn new(client: Arc<C>, bus: Bus) -> Self {
        Self { client, bus }
    }

    fn message() -> String {
        format!("{} Hello world!", Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"))
    }
}

#[async_trait]
impl<C: HubClient + ?Sized> Operation for SendEvent<C> {
    fn name(&self) -> &str {
        "send-event"
    }

    async fn perform(&self, ctx: CancellationToken) -> Result<(), OperationError> {
        let message = Self::message();
        output(
            &self.bus,
            self.name(),
            format!("Sending an event as {}: {message}...", self.client.identity()),
        );
        tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(OperationError::Canceled),
            sent = self.client.send_event(message.into_bytes()) => sent?,
        }
        output(&self.bus, self.name(), "done");
        Ok(())
    }
}
