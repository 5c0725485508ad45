// JSON-RPC subscribe / long-poll / unsubscribe.
//
// These three calls share the `/remote/json-rpc` endpoint and the
// JSON-RPC 2.0 envelope. They are single-shot primitives; the session
// loop on top of them lives in [`crate::polling`].

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::client::BshcClient;
use crate::error::Error;
use crate::models::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::{CallOptions, Endpoint, Port};

const JSON_RPC_PATH: &str = "/remote/json-rpc";

/// Topic filter covering every event the controller emits.
const WILDCARD_TOPIC: &str = "com/bosch/sh/remote/*";

/// Server-side long-poll window the controller defaults to.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack added to the client-side deadline on top of the server window.
pub const DEFAULT_POLL_PADDING: Duration = Duration::from_millis(1000);

impl BshcClient {
    /// Subscribe to controller events and return the subscription id.
    ///
    /// JSON-RPC `RE/subscribe` with the wildcard topic filter.
    pub async fn subscribe(&self) -> Result<String, Error> {
        let request = JsonRpcRequest::new("RE/subscribe", json!([WILDCARD_TOPIC, null]));
        let envelope: JsonRpcResponse<String> =
            self.json_rpc(&request, &CallOptions::default()).await?;
        let id = envelope.result.ok_or_else(|| Error::Parsing {
            message: "json-rpc subscribe response carries no subscription id".into(),
            body: String::new(),
        })?;
        debug!(subscription = %id, "subscribed to controller events");
        Ok(id)
    }

    /// Poll for events with the default 30 s window.
    pub async fn long_poll(&self, subscription_id: &str) -> Result<Vec<Value>, Error> {
        self.long_poll_with_delay(subscription_id, DEFAULT_POLL_TIMEOUT, DEFAULT_POLL_PADDING)
            .await
    }

    /// Poll for events. `timeout` is transmitted to the controller (in
    /// seconds) and honored server-side; the client-side deadline is
    /// `timeout + padding` because the transport cannot otherwise detect
    /// a controller that silently stops responding.
    ///
    /// A JSON-RPC error in the response fails the call with a
    /// [`Polling`](crate::ErrorKind::Polling)-kind error; the convention
    /// is to treat the subscription as dead and subscribe again.
    pub async fn long_poll_with_delay(
        &self,
        subscription_id: &str,
        timeout: Duration,
        padding: Duration,
    ) -> Result<Vec<Value>, Error> {
        let request =
            JsonRpcRequest::new("RE/longPoll", json!([subscription_id, timeout.as_secs()]));
        let options = CallOptions {
            timeout: Some(timeout + padding),
            ..CallOptions::default()
        };
        let envelope: JsonRpcResponse<Vec<Value>> = self.json_rpc(&request, &options).await?;
        Ok(envelope.result.unwrap_or_default())
    }

    /// Stop the subscription. The result payload carries no information
    /// and is discarded.
    ///
    /// JSON-RPC `RE/unsubscribe`.
    pub async fn unsubscribe(&self, subscription_id: &str) -> Result<(), Error> {
        let request = JsonRpcRequest::new("RE/unsubscribe", json!([subscription_id]));
        let _: JsonRpcResponse<Value> = self.json_rpc(&request, &CallOptions::default()).await?;
        debug!(subscription = %subscription_id, "unsubscribed from controller events");
        Ok(())
    }

    /// Issue one JSON-RPC call and unwrap the envelope. An `error` object
    /// in an otherwise successful response is escalated here -- exactly
    /// once -- as a `Polling`-kind error.
    async fn json_rpc<T: serde::de::DeserializeOwned>(
        &self,
        request: &JsonRpcRequest,
        options: &CallOptions,
    ) -> Result<JsonRpcResponse<T>, Error> {
        let endpoint = Endpoint::post(Port::Common, JSON_RPC_PATH).json(request.to_value());
        let response = self.transport().execute(&endpoint, options).await?;
        let mut envelope: JsonRpcResponse<T> = response.payload.ok_or_else(|| Error::Parsing {
            message: "empty json-rpc response".into(),
            body: String::new(),
        })?;
        if let Some(err) = envelope.error.take() {
            return Err(Error::Polling { code: err.code, message: err.message });
        }
        Ok(envelope)
    }
}
