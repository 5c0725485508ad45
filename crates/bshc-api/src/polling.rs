//! Long-poll event loop with auto-resubscribe.
//!
//! The client only exposes single-shot subscribe / poll / unsubscribe
//! primitives; this module composes them into a session loop and streams
//! events through a [`tokio::sync::broadcast`] channel. On a
//! [`Polling`](crate::ErrorKind::Polling)-kind error the subscription is
//! treated as dead and re-established; on transport errors the poll is
//! retried after a fixed delay.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bshc_api::polling::{LongPollHandle, PollConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let handle = LongPollHandle::start(Arc::new(client), PollConfig::default(), cancel.clone());
//! let mut rx = handle.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     println!("{event}");
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::client::BshcClient;
use crate::client::events::{DEFAULT_POLL_PADDING, DEFAULT_POLL_TIMEOUT};
use crate::error::ErrorKind;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Tuning for the long-poll session loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Server-side poll window. Default: 30 s.
    pub timeout: Duration,

    /// Client-side deadline slack on top of the window. Default: 1 s.
    pub padding: Duration,

    /// Delay before retrying after a transport error. Default: 2 s.
    pub retry_delay: Duration,

    /// Maximum consecutive failed attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            padding: DEFAULT_POLL_PADDING,
            retry_delay: Duration::from_secs(2),
            max_retries: None,
        }
    }
}

/// Handle to a running long-poll session.
///
/// Dropping the handle does not stop the loop; call
/// [`shutdown`](Self::shutdown) (or cancel the token passed to
/// [`start`](Self::start)) to tear it down.
pub struct LongPollHandle {
    event_rx: broadcast::Receiver<Arc<Value>>,
    cancel: CancellationToken,
}

impl LongPollHandle {
    /// Spawn the session loop and return immediately. The first
    /// subscription is established asynchronously.
    pub fn start(client: Arc<BshcClient>, config: PollConfig, cancel: CancellationToken) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            poll_loop(client, config, event_tx, task_cancel).await;
        });

        Self { event_rx, cancel }
    }

    /// Get a new broadcast receiver for the event stream.
    ///
    /// Multiple consumers can subscribe concurrently. A consumer that
    /// falls behind receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Value>> {
        self.event_rx.resubscribe()
    }

    /// Signal the session loop to unsubscribe and exit.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Session loop: subscribe → poll repeatedly → resubscribe on protocol
/// error, retry with delay on transport error, unsubscribe on cancel.
async fn poll_loop(
    client: Arc<BshcClient>,
    config: PollConfig,
    event_tx: broadcast::Sender<Arc<Value>>,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    'session: while !cancel.is_cancelled() {
        let subscription_id = tokio::select! {
            biased;
            () = cancel.cancelled() => break 'session,
            result = client.subscribe() => match result {
                Ok(id) => {
                    attempt = 0;
                    id
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "subscribe failed");
                    if give_up(&mut attempt, config.max_retries) {
                        break 'session;
                    }
                    if wait_or_cancelled(config.retry_delay, &cancel).await {
                        break 'session;
                    }
                    continue 'session;
                }
            },
        };

        tracing::info!(subscription = %subscription_id, "long-poll session established");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    // Best effort -- the controller drops stale
                    // subscriptions on its own eventually.
                    if let Err(e) = client.unsubscribe(&subscription_id).await {
                        tracing::debug!(error = %e, "unsubscribe on shutdown failed");
                    }
                    break 'session;
                }
                result = client.long_poll_with_delay(
                    &subscription_id,
                    config.timeout,
                    config.padding,
                ) => match result {
                    Ok(events) => {
                        attempt = 0;
                        for event in events {
                            // Send errors only mean no active subscribers.
                            let _ = event_tx.send(Arc::new(event));
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Polling => {
                        tracing::warn!(error = %e, "subscription rejected, resubscribing");
                        continue 'session;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "long poll failed");
                        if give_up(&mut attempt, config.max_retries) {
                            break 'session;
                        }
                        if wait_or_cancelled(config.retry_delay, &cancel).await {
                            break 'session;
                        }
                    }
                },
            }
        }
    }

    tracing::debug!("long-poll loop exiting");
}

/// Bump the attempt counter; `true` once the retry budget is spent.
fn give_up(attempt: &mut u32, max_retries: Option<u32>) -> bool {
    if let Some(max) = max_retries {
        if *attempt >= max {
            tracing::error!(max_retries = max, "long-poll retry limit reached, giving up");
            return true;
        }
    }
    *attempt += 1;
    false
}

/// Sleep for `delay`; `true` if cancelled while sleeping.
async fn wait_or_cancelled(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(delay) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_poll_config() {
        let config = PollConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.padding, Duration::from_millis(1000));
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn give_up_respects_retry_budget() {
        let mut attempt = 0;
        assert!(!give_up(&mut attempt, Some(2)));
        assert!(!give_up(&mut attempt, Some(2)));
        assert!(give_up(&mut attempt, Some(2)));
    }

    #[test]
    fn give_up_never_triggers_without_limit() {
        let mut attempt = 0;
        for _ in 0..100 {
            assert!(!give_up(&mut attempt, None));
        }
        assert_eq!(attempt, 100);
    }
}
