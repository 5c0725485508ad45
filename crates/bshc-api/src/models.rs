// Wire-level data shapes shared across the pairing and resource clients.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Extracts `filename="..."` from a `Content-Disposition` header value.
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r#"filename="([^"]+)""#).unwrap()
});

/// A buffered binary payload, e.g. a downloaded backup file.
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    /// The raw body bytes.
    pub data: Vec<u8>,
    /// The full `Content-Disposition` header value, if present.
    pub content_disposition: Option<String>,
    /// File name extracted from the content disposition, if possible.
    pub file_name: Option<String>,
}

impl BinaryResponse {
    /// Build a binary response from the buffered body and the
    /// `Content-Disposition` header value.
    pub(crate) fn from_parts(data: Vec<u8>, content_disposition: Option<String>) -> Self {
        let file_name = content_disposition
            .as_deref()
            .and_then(extract_file_name)
            .map(String::from);
        Self { data, content_disposition, file_name }
    }
}

fn extract_file_name(content_disposition: &str) -> Option<&str> {
    FILENAME_RE
        .captures(content_disposition)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Registration payload sent to the controller's admin pairing endpoint.
///
/// The controller expects the `oss_` / `OSS ` prefixes on id and name for
/// third-party clients; [`ClientRegistration::new`] adds them.
#[derive(Debug, Clone, Serialize)]
pub struct ClientRegistration {
    #[serde(rename = "@type")]
    type_name: &'static str,
    id: String,
    name: String,
    #[serde(rename = "primaryRole")]
    primary_role: &'static str,
    deleted: bool,
    certificate: String,
}

impl ClientRegistration {
    /// Create the registration body for a new client.
    ///
    /// `certificate` is the client certificate as PEM (with header/footer).
    pub fn new(name: &str, identifier: &str, certificate: &str) -> Self {
        Self {
            type_name: "client",
            id: format!("oss_{identifier}"),
            name: format!("OSS {name}"),
            primary_role: "ROLE_RESTRICTED_CLIENT",
            deleted: false,
            certificate: certificate.to_owned(),
        }
    }
}

/// Successful pairing answer: where the controller expects follow-up calls
/// and the token it handed out. The crate does not persist this; the caller
/// is responsible for storing the certificate it paired with.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingResponse {
    pub url: String,
    pub token: String,
}

/// Outgoing JSON-RPC 2.0 request for the subscribe/long-poll/unsubscribe trio.
/// [`to_value`](Self::to_value) is the only place the envelope is laid out.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(method: &'static str, params: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0", method, params }
    }

    /// The request as a JSON value, ready to be used as a call body.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": self.jsonrpc,
            "method": self.method,
            "params": self.params,
        })
    }
}

/// Incoming JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// Error object inside a JSON-RPC response. The controller reports long-poll
/// failures (e.g. unknown subscription id) this way, with HTTP status 200.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}
