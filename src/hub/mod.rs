//! # IoT hub collaborator.
//!
//! The probes only need two things from a hub: read the twin of the current
//! identity and send one event as that identity. [`HubClient`] is that seam;
//! [`HttpHubClient`] implements it over the hub's HTTPS REST surface using a
//! pre-issued shared access signature from the [`ConnectionString`].
//!
//! Token signing, vault lookups and AMQP/MQTT transports are outside this crate.

mod client;
mod connection;
mod error;

pub use client::{HttpHubClient, HubClient, API_VERSION};
pub use connection::ConnectionString;
pub use error::HubError;
