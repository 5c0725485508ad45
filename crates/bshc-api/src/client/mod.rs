// Resource client for the Smart Home Controller
//
// Wraps the transport with the `/smarthome` path catalog. All endpoint
// groups (devices, automation, security, climate, system, events) are
// implemented as inherent methods in separate files to keep this module
// focused on call mechanics. Every method is a stateless 1:1 mapping to
// a documented vendor endpoint -- no retries, no interpretation.

pub mod automation;
pub mod climate;
pub mod devices;
pub mod events;
pub mod security;
pub mod system;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::models::BinaryResponse;
use crate::transport::{BshcResponse, CallOptions, Endpoint, Port, Transport, TransportConfig};

pub use climate::ScheduleType;

/// Client for the controller's resource endpoints.
///
/// Construction binds the host and the client certificate pair for the
/// client's lifetime; the certificate is only ever used as TLS handshake
/// material. The client holds no other state, so concurrent calls from
/// multiple tasks are safe by construction.
pub struct BshcClient {
    transport: Transport,
}

impl BshcClient {
    /// Create a client for the given controller host.
    ///
    /// The config normally carries a [`ClientIdentity`](crate::ClientIdentity)
    /// -- without one, every resource call will be rejected by the
    /// controller as unauthenticated.
    pub fn new(host: &str, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self { transport: Transport::new(host, config)? })
    }

    /// Create a client on top of an existing transport.
    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Build a `/smarthome/...` path.
    pub(crate) fn smarthome(suffix: &str) -> String {
        format!("/smarthome/{suffix}")
    }

    /// Not-predefined call to the controller, for endpoints this crate
    /// does not wrap. The caller picks port, method, path, and body.
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        options: &CallOptions,
    ) -> Result<BshcResponse<T>, Error> {
        self.transport.execute(endpoint, options).await
    }

    /// Like [`call`](Self::call) but for binary responses.
    pub async fn call_binary(
        &self,
        endpoint: &Endpoint,
        options: &CallOptions,
    ) -> Result<BshcResponse<BinaryResponse>, Error> {
        self.transport.execute_binary(endpoint, options).await
    }

    /// Issue an endpoint call with default options, loosely typed.
    pub(crate) async fn send(&self, endpoint: Endpoint) -> Result<BshcResponse<Value>, Error> {
        self.transport.execute(&endpoint, &CallOptions::default()).await
    }

    /// GET a `/smarthome/...` resource on the common port.
    pub(crate) async fn get_resource(&self, suffix: &str) -> Result<BshcResponse<Value>, Error> {
        self.send(Endpoint::get(Port::Common, Self::smarthome(suffix))).await
    }
}

/// Insert the vendor `@type` discriminator if the caller left it out.
pub(crate) fn with_default_type(mut data: Value, type_name: &str) -> Value {
    if let Value::Object(ref mut map) = data {
        map.entry("@type")
            .or_insert_with(|| Value::String(type_name.to_owned()));
    }
    data
}
