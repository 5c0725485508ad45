// Top-level entry point: bundles the pairing client and the resource
// client for one controller, and drives the first-run pairing flow.

use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, info};

use crate::client::BshcClient;
use crate::error::Error;
use crate::models::PairingResponse;
use crate::pairing::{PairingClient, PairingConfig, retry_with_delay};
use crate::transport::{
    BshcResponse, ClientIdentity, DEFAULT_TIMEOUT, TlsPolicy, TransportConfig,
};

/// Everything needed to talk to one controller.
///
/// The certificate pair is the client's identity: generate it once (any
/// self-signed 2048-bit pair works), pair it via
/// [`BshcBridge::pair_if_needed`], and keep it -- the crate does not
/// persist anything.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Host name / IP address of the controller.
    pub host: String,
    /// Unique client identifier, e.g. from
    /// [`generate_identifier`](crate::pairing::generate_identifier).
    /// The `oss_` prefix is added automatically during pairing.
    pub identifier: String,
    /// Client certificate, PEM with header/footer.
    pub client_certificate_pem: String,
    /// Client private key, PEM (PKCS#8).
    pub client_private_key_pem: SecretString,
    /// Skip server certificate verification entirely.
    pub ignore_server_certificate: bool,
    /// Default per-call deadline. Default: 5000 ms.
    pub timeout: Duration,
}

impl BridgeConfig {
    pub fn new(
        host: impl Into<String>,
        identifier: impl Into<String>,
        client_certificate_pem: impl Into<String>,
        client_private_key_pem: SecretString,
    ) -> Self {
        Self {
            host: host.into(),
            identifier: identifier.into(),
            client_certificate_pem: client_certificate_pem.into(),
            client_private_key_pem,
            ignore_server_certificate: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Bridge to one Smart Home Controller: a pairing client for the first
/// run and a resource client for everything after.
pub struct BshcBridge {
    client: BshcClient,
    pairing: PairingClient,
    identifier: String,
    certificate_pem: String,
}

impl BshcBridge {
    /// Build both clients from the config. Fails if the TLS material
    /// cannot be loaded or the host does not form a valid URL.
    pub fn new(config: &BridgeConfig) -> Result<Self, Error> {
        let tls = if config.ignore_server_certificate {
            TlsPolicy::DangerAcceptInvalid
        } else {
            TlsPolicy::PinnedVendorRoot
        };
        let transport_config = TransportConfig {
            tls,
            timeout: config.timeout,
            identity: Some(ClientIdentity {
                certificate_pem: config.client_certificate_pem.clone(),
                private_key_pem: config.client_private_key_pem.clone(),
            }),
            ..TransportConfig::default()
        };

        let client = BshcClient::new(&config.host, &transport_config)?;
        let pairing = PairingClient::new(&config.host, &transport_config)?;

        Ok(Self {
            client,
            pairing,
            identifier: config.identifier.clone(),
            certificate_pem: config.client_certificate_pem.clone(),
        })
    }

    /// Assemble a bridge from pre-built clients (tests, proxies).
    pub fn from_parts(
        client: BshcClient,
        pairing: PairingClient,
        identifier: impl Into<String>,
        certificate_pem: impl Into<String>,
    ) -> Self {
        Self {
            client,
            pairing,
            identifier: identifier.into(),
            certificate_pem: certificate_pem.into(),
        }
    }

    /// The resource client for actual communication after pairing.
    pub fn client(&self) -> &BshcClient {
        &self.client
    }

    /// Pair this client's certificate with the controller, unless it
    /// already is.
    ///
    /// The check is a harmless authenticated read (the room list): if it
    /// succeeds, no pairing request is ever sent and `Ok(None)` is
    /// returned. Otherwise the pairing request is retried with
    /// `config.delay` between attempts, up to `config.attempts` total
    /// attempts, to give a human time to press the pairing button on the
    /// controller. Exhausting the attempts surfaces the final error.
    ///
    /// A 201 response is the documented success; any other success status
    /// is logged as unexpected but still returned -- semantic validation
    /// is the caller's job.
    pub async fn pair_if_needed(
        &self,
        name: &str,
        system_password: SecretString,
        config: PairingConfig,
    ) -> Result<Option<BshcResponse<PairingResponse>>, Error> {
        info!(identifier = %self.identifier, "checking whether client is already paired");

        match self.client.get_rooms().await {
            Ok(_) => {
                info!(identifier = %self.identifier, "already paired, using existing certificate");
                return Ok(None);
            }
            Err(probe_error) => {
                debug!(error = %probe_error, "paired-check read failed");
                info!(identifier = %self.identifier, "client not paired yet");
            }
        }

        info!("start pairing: press the button on the controller until it flashes");
        let response = retry_with_delay(config.attempts, config.delay, |_attempt| {
            let password = system_password.clone();
            async move {
                self.pairing
                    .send_pairing_request(&self.identifier, name, &self.certificate_pem, password)
                    .await
            }
        })
        .await?;

        if response.status == 201 {
            info!("pairing successful");
        } else {
            info!(status = response.status, "unexpected pairing response, check input data");
        }
        Ok(Some(response))
    }
}
