//! # FetchUrl: is the internet reachable?

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;

use super::output;
use crate::error::OperationError;
use crate::events::Bus;
use crate::operations::Operation;

/// URL fetched when none is given.
pub const DEFAULT_URL: &str = "https://raw.githubusercontent.com/Azure/iotedge/master/LICENSE";

/// GETs one URL per run and prints the body.
pub struct FetchUrl {
    http: Client,
    url: Url,
    bus: Bus,
}

impl FetchUrl {
    /// Creates the operation for `url`; output goes to `bus`.
    pub fn new(url: Url, bus: Bus) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().build()?,
            url,
            bus,
        })
    }

    /// Fetches the body; non-2xx statuses are failures.
    pub async fn fetch(&self) -> Result<String, OperationError> {
        self.http
            .get(self.url.clone())
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(OperationError::failed)?
            .text()
            .await
            .map_err(OperationError::failed)
    }
}

#[async_trait]
impl Operation for FetchUrl {
    fn name(&self) -> &str {
        "fetch-url"
    }

    async fn perform(&self, ctx: CancellationToken) -> Result<(), OperationError> {
        output(&self.bus, self.name(), format!("Requesting GET '{}'...", self.url));
        let body = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(OperationError::Canceled),
            body = self.fetch() => body?,
        };
        output(&self.bus, self.name(), body);
        Ok(())
    }
}
