//! Async Rust client for the Bosch Smart Home Controller local API.
//!
//! Talks HTTPS to a controller on the local network: a one-time
//! certificate pairing handshake on the admin port (8443), then typed
//! wrappers around the REST endpoints and the JSON-RPC long-polling
//! trio on the common port (8444). Certificate generation and storage
//! are out of scope -- the crate consumes PEM strings and never
//! persists anything.
//!
//! ```rust,ignore
//! use bshc_api::{BridgeConfig, BshcBridge, PairingConfig};
//!
//! let config = BridgeConfig::new(host, identifier, cert_pem, key_pem.into());
//! let bridge = BshcBridge::new(&config)?;
//! bridge.pair_if_needed("my-app", system_password.into(), PairingConfig::default()).await?;
//! let rooms = bridge.client().get_rooms().await?;
//! ```

pub mod bridge;
pub mod client;
pub mod error;
pub mod models;
pub mod pairing;
pub mod polling;
pub mod transport;

pub use bridge::{BridgeConfig, BshcBridge};
pub use client::{BshcClient, ScheduleType};
pub use error::{Error, ErrorKind};
pub use models::{BinaryResponse, JsonRpcError, PairingResponse};
pub use pairing::{PairingClient, PairingConfig, generate_identifier};
pub use polling::{LongPollHandle, PollConfig};
pub use transport::{
    BshcResponse, CallOptions, ClientIdentity, Endpoint, Method, Port, TlsPolicy, Transport,
    TransportConfig,
};
