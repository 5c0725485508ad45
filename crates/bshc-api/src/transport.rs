// Single-shot HTTPS transport for the Smart Home Controller.
//
// Every operation in this crate boils down to one call through
// [`Transport::execute`] or [`Transport::execute_binary`]: build the
// request, run it, buffer the body, classify the outcome. There is no
// retry, caching, or pooling logic here -- connection reuse is whatever
// `reqwest` does on its own.

use std::time::Duration;

use base64::Engine as _;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::BinaryResponse;

/// Root certificate of the vendor CA that signs controller certificates.
/// Peer chains must terminate here unless verification is bypassed.
const VENDOR_ROOT_CA: &str = include_str!("shc-root-ca.pem");

/// API version the controller expects on JSON calls.
const API_VERSION: &str = "3.12";

/// Default per-call deadline. Long-poll calls override this per request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Administrative pairing port.
pub const DEFAULT_ADMIN_PORT: u16 = 8443;

/// Common operational port.
pub const DEFAULT_COMMON_PORT: u16 = 8444;

// ── TLS configuration ────────────────────────────────────────────────

/// Server certificate verification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Verify the peer chain against the embedded vendor root CA.
    ///
    /// Standard SAN/hostname matching is disabled because controller
    /// certificates fail it; instead every request URL is pinned to the
    /// configured host.
    #[default]
    PinnedVendorRoot,
    /// Accept any server certificate ("ignore server certificate" flag).
    DangerAcceptInvalid,
}

/// Client certificate and private key, both PEM-encoded.
///
/// The transport only ever borrows this material to feed the TLS
/// handshake; it is never mutated or persisted.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub certificate_pem: String,
    pub private_key_pem: SecretString,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsPolicy,
    pub timeout: Duration,
    /// Client certificate pair for mutual TLS. `None` for the pairing
    /// client -- the pairing request itself is not mutually authenticated.
    pub identity: Option<ClientIdentity>,
    pub admin_port: u16,
    pub common_port: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            identity: None,
            admin_port: DEFAULT_ADMIN_PORT,
            common_port: DEFAULT_COMMON_PORT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("bshc-api/", env!("CARGO_PKG_VERSION")));

        match self.tls {
            TlsPolicy::PinnedVendorRoot => {
                let cert = reqwest::Certificate::from_pem(VENDOR_ROOT_CA.as_bytes())
                    .map_err(|e| Error::Tls(format!("invalid vendor root CA: {e}")))?;
                builder = builder
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(cert)
                    // controller certificates fail SAN matching
                    .danger_accept_invalid_hostnames(true);
            }
            TlsPolicy::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref identity) = self.identity {
            let id = reqwest::Identity::from_pkcs8_pem(
                identity.certificate_pem.as_bytes(),
                identity.private_key_pem.expose_secret().as_bytes(),
            )
            .map_err(|e| Error::Tls(format!("invalid client identity: {e}")))?;
            builder = builder.identity(id);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Copy of this config without the client identity (pairing transport).
    pub fn without_identity(&self) -> Self {
        Self { identity: None, ..self.clone() }
    }
}

// ── Request description ──────────────────────────────────────────────

/// Which controller port a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// Administrative pairing port (8443 by convention).
    Admin,
    /// Common operational port (8444 by convention).
    Common,
}

/// HTTP method of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request body shape. Once built it is immutable for the duration of
/// the call.
#[derive(Debug, Clone)]
pub enum Body {
    None,
    /// Sent verbatim with a JSON content type (some vendor payloads are
    /// assembled as strings upstream).
    Raw(String),
    /// Serialized to JSON.
    Json(serde_json::Value),
    /// Sent as-is with `application/octet-stream`.
    Binary(Vec<u8>),
}

/// Immutable description of one call: port, method, path, body, and
/// whether the response is expected to be binary. Constructed fresh for
/// every invocation.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub port: Port,
    pub method: Method,
    pub path: String,
    pub body: Body,
    pub binary_response: bool,
}

impl Endpoint {
    pub fn new(port: Port, method: Method, path: impl Into<String>) -> Self {
        Self {
            port,
            method,
            path: path.into(),
            body: Body::None,
            binary_response: false,
        }
    }

    pub fn get(port: Port, path: impl Into<String>) -> Self {
        Self::new(port, Method::Get, path)
    }

    pub fn post(port: Port, path: impl Into<String>) -> Self {
        Self::new(port, Method::Post, path)
    }

    pub fn put(port: Port, path: impl Into<String>) -> Self {
        Self::new(port, Method::Put, path)
    }

    pub fn delete(port: Port, path: impl Into<String>) -> Self {
        Self::new(port, Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    /// Attach a pre-serialized string body (sent verbatim).
    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = Body::Raw(body.into());
        self
    }

    /// Attach a raw binary body.
    pub fn binary(mut self, data: Vec<u8>) -> Self {
        self.body = Body::Binary(data);
        self
    }

    /// Declare that the response body is binary, switching the `Accept`
    /// header to `application/octet-stream`.
    pub fn expect_binary(mut self) -> Self {
        self.binary_response = true;
        self
    }
}

/// Per-call overrides merged into the outbound request.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Replaces the default deadline for this call only.
    pub timeout: Option<Duration>,
    /// Extra headers; these win over the defaults the transport sets.
    pub headers: HeaderMap,
    /// Sent base64-encoded as the `Systempassword` header.
    pub system_password: Option<SecretString>,
    /// Best-effort abort: cancelling the token fails the call with
    /// [`ErrorKind::Abort`](crate::ErrorKind::Abort).
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn with_system_password(password: SecretString) -> Self {
        Self { system_password: Some(password), ..Self::default() }
    }
}

// ── Response envelope ────────────────────────────────────────────────

/// Raw transport metadata plus the parsed payload of one completed call.
///
/// `payload` is `None` for 204 / empty-body responses -- no payload in,
/// no payload out, no error.
#[derive(Debug, Clone)]
pub struct BshcResponse<T> {
    pub status: u16,
    pub headers: HeaderMap,
    pub payload: Option<T>,
}

// ── Transport ────────────────────────────────────────────────────────

/// Executes exactly one HTTPS request/response cycle per call against a
/// fixed controller host.
pub struct Transport {
    http: reqwest::Client,
    admin_base: Url,
    common_base: Url,
    expected_host: Option<String>,
    default_timeout: Duration,
}

impl Transport {
    /// Create a transport for the given controller host.
    pub fn new(host: &str, config: &TransportConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        let admin_base = Url::parse(&format!("https://{host}:{}", config.admin_port))?;
        let common_base = Url::parse(&format!("https://{host}:{}", config.common_port))?;
        Ok(Self {
            http,
            admin_base,
            common_base,
            expected_host: Some(host.to_owned()),
            default_timeout: config.timeout,
        })
    }

    /// Create a transport from a pre-built client and explicit base URLs.
    ///
    /// Useful for tests and for controllers reachable through a proxy;
    /// host pinning is skipped because the bases are caller-chosen.
    pub fn with_endpoints(http: reqwest::Client, admin_base: Url, common_base: Url) -> Self {
        Self {
            http,
            admin_base,
            common_base,
            expected_host: None,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    fn base(&self, port: Port) -> &Url {
        match port {
            Port::Admin => &self.admin_base,
            Port::Common => &self.common_base,
        }
    }

    /// Run the call and parse the buffered body as JSON.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        options: &CallOptions,
    ) -> Result<BshcResponse<T>, Error> {
        let (status, headers, bytes) = self.send(endpoint, options).await?;

        let payload = if bytes.is_empty() {
            None
        } else {
            let text = std::str::from_utf8(&bytes).map_err(|e| Error::Parsing {
                message: format!("response is not valid UTF-8: {e}"),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })?;
            Some(serde_json::from_str(text).map_err(|e| Error::Parsing {
                message: e.to_string(),
                body: text.to_owned(),
            })?)
        };

        Ok(BshcResponse { status, headers, payload })
    }

    /// Run the call and wrap the buffered body as a [`BinaryResponse`].
    pub async fn execute_binary(
        &self,
        endpoint: &Endpoint,
        options: &CallOptions,
    ) -> Result<BshcResponse<BinaryResponse>, Error> {
        let (status, headers, bytes) = self.send(endpoint, options).await?;

        let content_disposition = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(BshcResponse {
            status,
            headers,
            payload: Some(BinaryResponse::from_parts(bytes, content_disposition)),
        })
    }

    /// One request/response cycle: build, send, buffer, classify.
    async fn send(
        &self,
        endpoint: &Endpoint,
        options: &CallOptions,
    ) -> Result<(u16, HeaderMap, Vec<u8>), Error> {
        let url = self.base(endpoint.port).join(&endpoint.path)?;

        // Request URLs must stay pinned to the configured controller host.
        if let Some(ref expected) = self.expected_host {
            let got = url.host_str().unwrap_or_default();
            if got != expected {
                return Err(Error::HostnameMismatch {
                    got: got.to_owned(),
                    expected: expected.clone(),
                });
            }
        }

        debug!(method = ?endpoint.method, url = %url, "sending request to controller");

        let mut headers = HeaderMap::new();
        match endpoint.body {
            Body::Binary(_) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
            }
            Body::None | Body::Raw(_) | Body::Json(_) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert("api-version", HeaderValue::from_static(API_VERSION));
            }
        }
        let accept = if endpoint.binary_response {
            "application/octet-stream"
        } else {
            "application/json"
        };
        headers.insert(ACCEPT, HeaderValue::from_static(accept));

        if let Some(ref password) = options.system_password {
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(password.expose_secret());
            let value = HeaderValue::from_str(&encoded).map_err(|_| {
                Error::InvalidHeaderValue("base64-encoded system password".into())
            })?;
            headers.insert("systempassword", value);
        }

        // Caller-supplied headers override the defaults above.
        for (name, value) in &options.headers {
            headers.insert(name, value.clone());
        }

        let mut request = self
            .http
            .request(endpoint.method.as_reqwest(), url)
            .headers(headers)
            .timeout(options.timeout.unwrap_or(self.default_timeout));

        request = match endpoint.body {
            Body::None => request,
            Body::Raw(ref body) => request.body(body.clone()),
            Body::Json(ref value) => request.body(value.to_string()),
            Body::Binary(ref data) => request.body(data.clone()),
        };

        let roundtrip = async {
            let response = request.send().await.map_err(Error::from_reqwest)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let bytes = response.bytes().await.map_err(Error::from_reqwest)?;
            Ok::<_, Error>((status, headers, bytes.to_vec()))
        };

        let (status, headers, bytes) = match options.cancel {
            Some(ref token) => tokio::select! {
                biased;
                () = token.cancelled() => return Err(Error::Abort),
                result = roundtrip => result?,
            },
            None => roundtrip.await?,
        };

        debug!(status, bytes = bytes.len(), "response received from controller");

        // An HTTP error is an error even if the body would parse.
        if status >= 300 {
            let body = (!bytes.is_empty())
                .then(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(Error::Http { status, body });
        }

        Ok((status, headers, bytes))
    }
}
