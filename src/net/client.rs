//! HTTP client for a remote decision service.
//!
//! Every call here is best-effort: transport failures log one warning and
//! surface as `None`, and the caller falls back to local behavior. The
//! state publisher is a bounded queue drained by a single I/O task, so a
//! slow or dead remote never blocks the simulation tick.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::game::constants::net;
use crate::game::geom::Rect;
use crate::net::protocol::{Command, SensorRequest, WallsPayload, WorldState};

#[derive(Debug, Error)]
pub enum NetError {
    #[error("http transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("publish queue is closed")]
    QueueClosed,
}

/// Client for the remote decision service
pub struct RemoteClient {
    client: Client,
    decide_client: Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: String) -> Result<Self, NetError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(net::TRANSPORT_TIMEOUT_MS))
            .build()?;
        // Decisions sit on the tick's critical path and get a tighter budget
        let decide_client = Client::builder()
            .timeout(Duration::from_millis(net::DECIDE_TIMEOUT_MS))
            .build()?;
        Ok(Self {
            client,
            decide_client,
            base_url,
        })
    }

    /// Fetch the wall layout, `None` on any failure (caller falls back to
    /// the built-in labyrinth)
    pub async fn fetch_walls(&self) -> Option<Vec<Rect>> {
        let url = format!("{}/walls", self.base_url);
        match self.get_json::<WallsPayload>(&url).await {
            Ok(payload) => Some(payload.walls),
            Err(err) => {
                warn!(%err, "wall fetch failed, using built-in layout");
                None
            }
        }
    }

    /// Ask the remote service for a command; `None` means fall back to the
    /// local policy
    pub async fn request_decision(&self, request: &SensorRequest) -> Option<Command> {
        let url = format!("{}/decide", self.base_url);
        let result: Result<Command, NetError> = async {
            let response = self
                .decide_client
                .post(&url)
                .json(request)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.json().await?)
        }
        .await;

        match result {
            Ok(cmd) => Some(cmd),
            Err(err) => {
                warn!(%err, "remote decision failed, using local policy");
                None
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, NetError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post_state(&self, state: &WorldState) -> Result<(), NetError> {
        let url = format!("{}/update_state", self.base_url);
        self.client
            .post(&url)
            .json(state)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Fire-and-forget state publisher.
///
/// Snapshots go into a bounded queue; a single worker drains it, enforcing
/// the publish rate cap. When the queue is full the snapshot is dropped,
/// never awaited.
pub struct StatePublisher {
    tx: mpsc::Sender<WorldState>,
}

impl StatePublisher {
    /// Spawn the drain task and return the queue handle
    pub fn spawn(client: RemoteClient) -> Self {
        let (tx, mut rx) = mpsc::channel::<WorldState>(net::PUBLISH_QUEUE_CAPACITY);

        tokio::spawn(async move {
            let min_period = Duration::from_secs_f64(net::PUBLISH_MIN_PERIOD);
            let mut last_send: Option<tokio::time::Instant> = None;

            while let Some(state) = rx.recv().await {
                if let Some(previous) = last_send {
                    let elapsed = previous.elapsed();
                    if elapsed < min_period {
                        tokio::time::sleep(min_period - elapsed).await;
                    }
                }
                last_send = Some(tokio::time::Instant::now());

                if let Err(err) = client.post_state(&state).await {
                    debug!(%err, "state publish failed");
                }
            }
        });

        Self { tx }
    }

    /// Queue a snapshot without blocking. Returns false when the snapshot
    /// was dropped on backpressure.
    pub fn publish(&self, state: WorldState) -> bool {
        match self.tx.try_send(state) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("publish queue full, dropping snapshot");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("publish worker gone, dropping snapshot");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_walls_unreachable_falls_back() {
        // Nothing listens on this port; the call must fail cleanly
        let client = RemoteClient::new("http://127.0.0.1:9".to_string()).unwrap();
        assert!(client.fetch_walls().await.is_none());
    }

    #[tokio::test]
    async fn test_request_decision_unreachable_falls_back() {
        let client = RemoteClient::new("http://127.0.0.1:9".to_string()).unwrap();
        let req = SensorRequest {
            ship_id: 0,
            position: crate::net::protocol::Position { x: 0.0, y: 0.0 },
            angle: 0.0,
        };
        assert!(client.request_decision(&req).await.is_none());
    }

    #[tokio::test]
    async fn test_publisher_drops_on_backpressure() {
        let client = RemoteClient::new("http://127.0.0.1:9".to_string()).unwrap();
        let publisher = StatePublisher::spawn(client);

        // Flood well past queue capacity; the rate limiter keeps the worker
        // busy, so at least one snapshot must be dropped without blocking.
        let mut dropped = 0;
        for _ in 0..100 {
            if !publisher.publish(WorldState::default()) {
                dropped += 1;
            }
        }
        assert!(dropped > 0);
    }
}
