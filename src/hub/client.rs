//! # Hub client seam and its HTTPS implementation.

use async_trait::async_trait;
use reqwest::{header, Client, Response, Url};
use serde::Deserialize;

use super::{ConnectionString, HubError};
use crate::error::OperationError;

/// REST API version sent with every request.
pub const API_VERSION: &str = "2021-04-12";

/// What the probes need from a hub.
///
/// Implementations do not watch for cancellation; callers race the returned
/// futures against their token and drop them to abort.
#[async_trait]
pub trait HubClient: Send + Sync + 'static {
    /// `device` or `device/module`.
    fn identity(&self) -> String;

    /// Fetches the twin document of this identity.
    async fn get_twin(&self) -> Result<serde_json::Value, OperationError>;

    /// Sends one event as this identity.
    async fn send_event(&self, payload: Vec<u8>) -> Result<(), OperationError>;
}

/// Error body returned by the hub on non-2xx responses.
#[derive(Deserialize)]
struct HubErrorBody {
    #[serde(rename = "Message")]
    message: Option<String>,
}

/// [`HubClient`] over HTTPS with a pre-issued shared access signature.
#[derive(Clone)]
pub struct HttpHubClient {
    http: Client,
    base: Url,
    device_id: String,
    module_id: Option<String>,
    signature: String,
}

impl HttpHubClient {
    /// Builds a client for the identity in `cs`.
    ///
    /// Requires `SharedAccessSignature`; a bare `SharedAccessKey` is rejected.
    pub fn from_connection_string(cs: &ConnectionString) -> Result<Self, HubError> {
        let signature = cs
            .shared_access_signature
            .clone()
            .ok_or(HubError::SignatureRequired)?;
        let host = cs.endpoint_host();
        let base = Url::parse(&format!("https://{host}/")).map_err(|_| HubError::InvalidHost {
            host: host.to_string(),
        })?;
        Ok(Self {
            http: Client::builder().build()?,
            base,
            device_id: cs.device_id.clone(),
            module_id: cs.module_id.clone(),
            signature,
        })
    }

    /// Sends requests to `base` instead of the connection string's host.
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base = base;
        self
    }

    /// `twins/{device}[/modules/{module}]`
    pub fn twin_url(&self) -> Result<Url, OperationError> {
        let mut segments = vec!["twins", self.device_id.as_str()];
        if let Some(module) = &self.module_id {
            segments.extend(["modules", module.as_str()]);
        }
        self.url(&segments)
    }

    /// `devices/{device}[/modules/{module}]/messages/events`
    pub fn events_url(&self) -> Result<Url, OperationError> {
        let mut segments = vec!["devices", self.device_id.as_str()];
        if let Some(module) = &self.module_id {
            segments.extend(["modules", module.as_str()]);
        }
        segments.extend(["messages", "events"]);
        self.url(&segments)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, OperationError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                OperationError::failed(format!("cannot use '{}' as a base URL", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }
}

/// Turns a non-2xx response into a failure carrying the hub's message.
async fn check(resp: Response) -> Result<Response, OperationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<HubErrorBody>(&text)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or(text);
    Err(OperationError::failed(format!("HTTP {status}: {detail}")))
}

#[async_trait]
impl HubClient for HttpHubClient {
    fn identity(&self) -> String {
        match &self.module_id {
            Some(module) => format!("{}/{module}", self.device_id),
            None => self.device_id.clone(),
        }
    }

    async fn get_twin(&self) -> Result<serde_json::Value, OperationError> {
        let resp = self
            .http
            .get(self.twin_url()?)
            .header(header::AUTHORIZATION, &self.signature)
            .send()
            .await
            .map_err(OperationError::failed)?;
        check(resp)
            .await?
            .json()
            .await
            .map_err(OperationError::failed)
    }

    async fn send_event(&self, payload: Vec<u8>) -> Result<(), OperationError> {
        let resp = self
            .http
            .post(self.events_url()?)
            .header(header::AUTHORIZATION, &self.signature)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await
            .map_err(OperationError::failed)?;
        check(resp).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve_once;

    fn client(cs: &str, base: &str) -> HttpHubClient {
        let cs = ConnectionString::parse(cs).unwrap();
        HttpHubClient::from_connection_string(&cs)
            .unwrap()
            .with_base_url(Url::parse(base).unwrap())
    }

    #[test]
    fn builds_identity_paths() {
        let device = client(
            "HostName=h;DeviceId=edge 1;SharedAccessSignature=sas",
            "https://h/",
        );
        assert_eq!(
            device.twin_url().unwrap().as_str(),
            "https://h/twins/edge%201?api-version=2021-04-12"
        );

        let module = client(
            "HostName=h;DeviceId=d;ModuleId=m;SharedAccessSignature=sas",
            "https://h/",
        );
        assert_eq!(
            module.events_url().unwrap().as_str(),
            "https://h/devices/d/modules/m/messages/events?api-version=2021-04-12"
        );
        assert_eq!(module.identity(), "d/m");
    }

    #[test]
    fn requires_a_signature() {
        let cs = ConnectionString::parse("HostName=h;DeviceId=d;SharedAccessKey=k").unwrap();
        assert!(matches!(
            HttpHubClient::from_connection_string(&cs),
            Err(HubError::SignatureRequired)
        ));
    }

    #[tokio::test]
    async fn get_twin_sends_signature() {
        let (base, request) =
            serve_once("200 OK", r#"{"properties":{"desired":{"$version":3}}}"#).await;
        let hub = client(
            "HostName=h;DeviceId=d;SharedAccessSignature=SharedAccessSignature sr=h",
            &base,
        );

        let twin = hub.get_twin().await.unwrap();
        assert_eq!(twin["properties"]["desired"]["$version"], 3);

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /twins/d?api-version=2021-04-12 HTTP/1.1"));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: sharedaccesssignature sr=h"));
    }

    #[tokio::test]
    async fn send_event_posts_payload_and_reports_hub_errors() {
        let (base, request) =
            serve_once("401 Unauthorized", r#"{"Message":"token expired"}"#).await;
        let hub = client(
            "HostName=h;DeviceId=d;ModuleId=m;SharedAccessSignature=sas",
            &base,
        );

        let err = hub.send_event(b"hello".to_vec()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "operation failed: HTTP 401 Unauthorized: token expired"
        );

        let request = request.await.unwrap();
        assert!(request
            .starts_with("POST /devices/d/modules/m/messages/events?api-version=2021-04-12"));
        assert!(request.ends_with("hello"));
    }
}
