// Certificate pairing against the controller's admin port.
//
// Pairing is a single POST of the client certificate, retried with a
// fixed delay so a human has time to press the physical pairing button
// on the controller. The retry never alters the payload.

use std::future::Future;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{ClientRegistration, PairingResponse};
use crate::transport::{BshcResponse, CallOptions, Endpoint, Port, Transport, TransportConfig};

const PAIR_PATH: &str = "/smarthome/clients";

/// Retry tuning for [`crate::BshcBridge::pair_if_needed`].
#[derive(Debug, Clone, Copy)]
pub struct PairingConfig {
    /// Delay between attempts. Default: 5000 ms.
    pub delay: Duration,
    /// Total number of attempts (not retries-after-first): with
    /// `attempts = N`, at most N pairing requests are sent. Default: 50.
    pub attempts: u32,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self { delay: Duration::from_millis(5000), attempts: 50 }
    }
}

/// Generate a random identifier for a new client, needed once before
/// the first pairing.
pub fn generate_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// Client for the controller's admin pairing endpoint.
///
/// Deliberately not mutually authenticated -- the point of the call is to
/// register the certificate that later calls will authenticate with.
pub struct PairingClient {
    transport: Transport,
}

impl PairingClient {
    /// Create a pairing client for the given host. Any client identity in
    /// the config is dropped.
    pub fn new(host: &str, config: &TransportConfig) -> Result<Self, Error> {
        let transport = Transport::new(host, &config.without_identity())?;
        Ok(Self { transport })
    }

    /// Create a pairing client on top of an existing transport (tests).
    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// Send one pairing request.
    ///
    /// `POST /smarthome/clients` on the admin port, carrying the client
    /// certificate, display name, and identifier; the system password is
    /// attached as the `Systempassword` header. The controller answers
    /// 201 with `{url, token}` once its pairing button has been pressed.
    pub async fn send_pairing_request(
        &self,
        identifier: &str,
        name: &str,
        certificate_pem: &str,
        system_password: SecretString,
    ) -> Result<BshcResponse<PairingResponse>, Error> {
        let registration = ClientRegistration::new(name, identifier, certificate_pem);
        let body = serde_json::to_value(&registration).map_err(|e| Error::Parsing {
            message: format!("failed to serialize registration: {e}"),
            body: String::new(),
        })?;

        let endpoint = Endpoint::post(Port::Admin, PAIR_PATH).json(body);
        let options = CallOptions::with_system_password(system_password);

        debug!(identifier, "sending pairing request");
        self.transport.execute(&endpoint, &options).await
    }
}

/// Run `operation` up to `attempts` times, sleeping `delay` between
/// failures, and surface the final error unchanged once attempts are
/// exhausted. The closure receives the 1-based attempt number.
pub(crate) async fn retry_with_delay<T, F, Fut>(
    attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                warn!(attempt, error = %err, "attempt failed, retrying after delay");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn pairing_config_defaults() {
        let config = PairingConfig::default();
        assert_eq!(config.delay, Duration::from_millis(5000));
        assert_eq!(config.attempts, 50);
    }

    #[test]
    fn generated_identifiers_are_unique() {
        assert_ne!(generate_identifier(), generate_identifier());
    }

    #[tokio::test]
    async fn retry_stops_on_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_delay(5, Duration::ZERO, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Error>(42) }
        })
        .await;
        assert_eq!(result.expect("success"), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_makes_exactly_n_attempts_then_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), Error> = retry_with_delay(3, Duration::ZERO, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Http { status: 401, body: None }) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.expect_err("failure").status(), Some(401));
    }

    #[tokio::test]
    async fn retry_succeeds_mid_sequence() {
        let calls = AtomicU32::new(0);
        let result = retry_with_delay(5, Duration::ZERO, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(Error::Timeout)
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.expect("success"), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
