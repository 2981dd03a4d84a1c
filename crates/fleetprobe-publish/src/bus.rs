//! Notification bus publisher
//!
//! Forwards status events to a WebSocket bus endpoint. The forwarder
//! reconnects with exponential backoff; events that arrive while the
//! bus is down stay buffered in the broadcast channel.

use std::time::Duration;

use futures::SinkExt;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};
use url::Url;

use fleetprobe_api::events::StatusEvent;

use crate::error::PublishError;

/// Publishes status events to a WebSocket notification bus
#[derive(Debug, Clone)]
pub struct BusPublisher {
    url: Url,
}

impl BusPublisher {
    /// Create a publisher for the given `ws://` or `wss://` endpoint
    pub fn new(url: impl AsRef<str>) -> Result<Self, PublishError> {
        Ok(Self {
            url: Url::parse(url.as_ref())?,
        })
    }

    /// The bus endpoint
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Spawn a task forwarding events from `rx` to the bus
    ///
    /// The task ends when all event senders are dropped. Connection
    /// failures are retried with exponential backoff.
    pub fn spawn_forwarder(
        self,
        rx: broadcast::Receiver<StatusEvent>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.forward_loop(rx).await;
        })
    }

    async fn forward_loop(&self, mut rx: broadcast::Receiver<StatusEvent>) {
        let mut backoff = Duration::from_secs(1);
        let max_backoff = Duration::from_secs(60);

        loop {
            match self.connect_and_forward(&mut rx).await {
                Ok(()) => {
                    info!(url = %self.url, "event channel closed, bus forwarder done");
                    break;
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, "bus connection lost, reconnecting in {backoff:?}");
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(max_backoff);
                }
            }
        }
    }

    /// Forward events over one connection until it breaks or `rx` closes
    async fn connect_and_forward(
        &self,
        rx: &mut broadcast::Receiver<StatusEvent>,
    ) -> Result<(), PublishError> {
        let (mut ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| PublishError::WebSocket(e.to_string()))?;

        info!(url = %self.url, "connected to notification bus");

        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "bus forwarder lagged, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    ws_stream.close(None).await.ok();
                    return Ok(());
                }
            };

            let json = serde_json::to_string(&event)?;

            ws_stream
                .send(Message::Text(json.into()))
                .await
                .map_err(|e| PublishError::WebSocket(e.to_string()))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_accepted() {
        assert!(BusPublisher::new("ws://localhost:9000/events").is_ok());
        assert!(BusPublisher::new("wss://bus.internal/events").is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(BusPublisher::new("not a url").is_err());
    }
}
