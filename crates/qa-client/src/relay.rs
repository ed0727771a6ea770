//! Remote event relay: reads the server's event socket and republishes each
//! frame into a client-local [`BroadcastHub`], so view sessions subscribe to
//! the same kind of hub whether they run in-process or across the network.
//!
//! A dropped socket simply stops the relay. Missed events are not replayed;
//! a view that needs to catch up must fetch again.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use qa_core::events::HubEvent;
use qa_core::hub::BroadcastHub;
use qa_core::traits::EventHub;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, warn};

use crate::commands::ClientError;

pub struct EventRelay {
    hub: Arc<BroadcastHub>,
    task: JoinHandle<()>,
}

impl EventRelay {
    /// Connects to `url` (e.g. `ws://127.0.0.1:8000/socket`) and starts
    /// relaying into a hub with the given per-subscriber capacity.
    pub async fn connect(url: &str, capacity: usize) -> Result<Self, ClientError> {
        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|err| ClientError::Socket(err.to_string()))?;
        debug!(target: "qa::delivery", %url, "event socket connected");

        let hub = Arc::new(BroadcastHub::with_capacity(capacity));
        let task = tokio::spawn(pump(stream, hub.clone()));
        Ok(Self { hub, task })
    }

    pub fn hub(&self) -> Arc<BroadcastHub> {
        self.hub.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for EventRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn pump<S>(mut stream: S, hub: Arc<BroadcastHub>)
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<HubEvent>(text.as_str()) {
                Ok(event) => {
                    hub.publish(event);
                }
                Err(err) => {
                    warn!(target: "qa::delivery", error = %err, "undecodable event frame dropped");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(target: "qa::delivery", error = %err, "event socket failed");
                break;
            }
        }
    }
    debug!(target: "qa::delivery", "event relay stopped");
}
