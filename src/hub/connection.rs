//! # Hub connection strings.
//!
//! Format: `Key=Value` pairs separated by `;`. Keys are matched
//! case-insensitively, values may themselves contain `=`, empty segments are
//! skipped and unknown keys are ignored.
//!
//! ```text
//! HostName=hub.azure-devices.net;DeviceId=edge-1;ModuleId=probe;
//! SharedAccessSignature=SharedAccessSignature sr=...&sig=...&se=...
//! ```

use std::fmt;

use super::HubError;

/// Parsed connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Hub host name.
    pub host_name: String,
    /// Device identity.
    pub device_id: String,
    /// Module identity; `None` when connecting as the device itself.
    pub module_id: Option<String>,
    /// Gateway to connect through instead of the hub (e.g. an edge hub).
    pub gateway_host_name: Option<String>,
    /// Symmetric key; carried but never used for signing.
    pub shared_access_key: Option<String>,
    /// Pre-issued shared access signature.
    pub shared_access_signature: Option<String>,
}

impl ConnectionString {
    /// Parses a connection string.
    ///
    /// # Example
    /// ```
    /// use edgeprobe::ConnectionString;
    ///
    /// let cs = ConnectionString::parse(
    ///     "HostName=hub.example.net;DeviceId=edge-1;SharedAccessSignature=SharedAccessSignature sr=x&sig=y=",
    /// ).unwrap();
    /// assert_eq!(cs.identity(), "edge-1");
    /// assert!(cs.shared_access_signature.unwrap().ends_with("sig=y="));
    /// ```
    pub fn parse(s: &str) -> Result<Self, HubError> {
        let mut host_name = None;
        let mut device_id = None;
        let mut module_id = None;
        let mut gateway_host_name = None;
        let mut shared_access_key = None;
        let mut shared_access_signature = None;

        for (index, segment) in s.split(';').enumerate() {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment
                .split_once('=')
                .ok_or(HubError::Malformed { index })?;
            let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());

            let slot = match key.trim() {
                k if k.eq_ignore_ascii_case("HostName") => &mut host_name,
                k if k.eq_ignore_ascii_case("DeviceId") => &mut device_id,
                k if k.eq_ignore_ascii_case("ModuleId") => &mut module_id,
                k if k.eq_ignore_ascii_case("GatewayHostName") => &mut gateway_host_name,
                k if k.eq_ignore_ascii_case("SharedAccessKey") => &mut shared_access_key,
                k if k.eq_ignore_ascii_case("SharedAccessSignature") => {
                    &mut shared_access_signature
                }
                _ => continue,
            };
            *slot = value;
        }

        Ok(Self {
            host_name: host_name.ok_or(HubError::MissingKey { key: "HostName" })?,
            device_id: device_id.ok_or(HubError::MissingKey { key: "DeviceId" })?,
            module_id,
            gateway_host_name,
            shared_access_key,
            shared_access_signature,
        })
    }

    /// `device` or `device/module`.
    pub fn identity(&self) -> String {
        match &self.module_id {
            Some(module) => format!("{}/{module}", self.device_id),
            None => self.device_id.clone(),
        }
    }

    /// The host requests go to: the gateway if one is set, the hub otherwise.
    pub fn endpoint_host(&self) -> &str {
        self.gateway_host_name.as_deref().unwrap_or(&self.host_name)
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("host_name", &self.host_name)
            .field("device_id", &self.device_id)
            .field("module_id", &self.module_id)
            .field("gateway_host_name", &self.gateway_host_name)
            .field("shared_access_key", &self.shared_access_key.as_ref().map(|_| "***"))
            .field(
                "shared_access_signature",
                &self.shared_access_signature.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_identity_through_gateway() {
        let cs = ConnectionString::parse(
            "hostname=hub.example.net; DeviceId=edge-1;ModuleId=probe;GatewayHostName=edgehub;;Extra=1",
        )
        .unwrap();
        assert_eq!(cs.host_name, "hub.example.net");
        assert_eq!(cs.identity(), "edge-1/probe");
        assert_eq!(cs.endpoint_host(), "edgehub");
        assert_eq!(cs.shared_access_signature, None);
    }

    #[test]
    fn empty_module_means_device() {
        let cs = ConnectionString::parse("HostName=h;DeviceId=d;ModuleId=").unwrap();
        assert_eq!(cs.module_id, None);
        assert_eq!(cs.identity(), "d");
        assert_eq!(cs.endpoint_host(), "h");
    }

    #[test]
    fn rejects_missing_keys_and_bad_segments() {
        assert!(matches!(
            ConnectionString::parse("HostName=h"),
            Err(HubError::MissingKey { key: "DeviceId" })
        ));
        assert!(matches!(
            ConnectionString::parse("HostName=h;oops;DeviceId=d"),
            Err(HubError::Malformed { index: 1 })
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let cs = ConnectionString::parse("HostName=h;DeviceId=d;SharedAccessKey=c2VjcmV0").unwrap();
        let printed = format!("{cs:?}");
        assert!(!printed.contains("c2VjcmV0"));
        assert!(printed.contains("***"));
    }
}
