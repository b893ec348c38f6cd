//! # GetTwin: can we read our own twin?

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::output;
use crate::error::OperationError;
use crate::events::Bus;
use crate::hub::HubClient;
use crate::operations::Operation;

/// Fetches and prints the twin of the client's identity.
pub struct GetTwin<C: HubClient + ?Sized> {
    client: Arc<C>,
    bus: Bus,
}

impl<C: HubClient + ?Sized> GetTwin<C> {
    /// Creates the operation; output goes to `bus`.
    pub fn new(client: Arc<C>, bus: Bus) -> Self {
        Self { client, bus }
    }
}

#[async_trait]
impl<C: HubClient + ?Sized> Operation for GetTwin<C> {
    fn name(&self) -> &str {
        "get-twin"
    }

    async fn perform(&self, ctx: CancellationToken) -> Result<(), OperationError> {
        output(
            &self.bus,
            self.name(),
            format!("Requesting twin for {}...", self.client.identity()),
        );
        let twin = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(OperationError::Canceled),
            twin = self.client.get_twin() => twin?,
        };
        let pretty = serde_json::to_string_pretty(&twin).map_err(OperationError::failed)?;
        output(&self.bus, self.name(), format!("Received twin:\n{pretty}"));
        Ok(())
    }
}
