use thiserror::Error;

/// Closed taxonomy of failure kinds surfaced by this crate.
///
/// Every [`Error`] variant maps onto exactly one kind via [`Error::kind`].
/// Callers that only need coarse branching (retry vs. resubscribe vs. give
/// up) match on this instead of the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic failure: network error, TLS setup, or HTTP status >= 300.
    Error,
    /// The call was cancelled by the caller.
    Abort,
    /// No response within the configured deadline.
    Timeout,
    /// Body could not be decoded as JSON despite a success status.
    Parsing,
    /// Application-level JSON-RPC error during long polling.
    Polling,
}

/// Top-level error type for the `bshc-api` crate.
///
/// Covers every failure mode of a single call to the Smart Home Controller.
/// Each failed call produces exactly one of these; nothing is double-wrapped
/// and nothing is silently discarded.
#[derive(Debug, Error)]
pub enum Error {
    /// The controller answered with a non-success HTTP status.
    ///
    /// Stateful operations (backup/restore) use vendor status codes such as
    /// 405/412/403 to signal already-exists, precondition-failed, etc. -- the
    /// raw status is preserved here and not interpreted further.
    #[error("call to controller failed with HTTP status {status}")]
    Http {
        status: u16,
        /// Buffered response body, if the controller sent one.
        body: Option<String>,
    },

    /// Network-level failure (connection refused, DNS, broken TLS stream).
    #[error("network error during call to controller")]
    Connection(#[source] reqwest::Error),

    /// The caller cancelled the request via its cancellation token.
    #[error("call to controller aborted by client")]
    Abort,

    /// No response within the configured deadline.
    #[error("timeout during call to controller")]
    Timeout,

    /// The controller returned a success status but the body was not
    /// valid JSON (or not valid UTF-8).
    #[error("error during parsing response from controller: {message}")]
    Parsing { message: String, body: String },

    /// JSON-RPC error object in an otherwise successful long-poll response.
    #[error("error during polling (code {code}): {message}")]
    Polling { code: i64, message: String },

    /// TLS material could not be loaded (root CA or client identity).
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// A caller-supplied value could not be encoded as an HTTP header.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(String),

    /// A request URL could not be constructed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request URL host does not match the configured controller host.
    #[error("hostname verification failed: got {got}, expected {expected}")]
    HostnameMismatch { got: String, expected: String },
}

impl Error {
    /// Classify a `reqwest` failure. This is the single point where
    /// transport-level errors enter the taxonomy.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Connection(err)
        }
    }

    /// The coarse failure kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Abort => ErrorKind::Abort,
            Self::Timeout => ErrorKind::Timeout,
            Self::Parsing { .. } => ErrorKind::Parsing,
            Self::Polling { .. } => ErrorKind::Polling,
            Self::Http { .. }
            | Self::Connection(_)
            | Self::Tls(_)
            | Self::InvalidHeaderValue(_)
            | Self::InvalidUrl(_)
            | Self::HostnameMismatch { .. } => ErrorKind::Error,
        }
    }

    /// The HTTP status code, if the controller answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if retrying the same call might succeed
    /// (used by the pairing loop and the long-poll driver).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_))
    }
}
