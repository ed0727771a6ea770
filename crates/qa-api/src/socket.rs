//! WebSocket fan-out: each connection owns one hub subscription for its
//! whole lifetime and forwards every event as a JSON text frame.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use qa_core::events::TopicFilter;
use qa_core::hub::Subscription;
use tracing::{debug, warn};

use crate::handlers::AppState;

/// `GET /socket`
pub async fn socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| {
        let subscription = state.hub.subscribe(TopicFilter::all());
        forward_events(socket, subscription)
    })
}

async fn forward_events(socket: WebSocket, mut subscription: Subscription) {
    let (mut sink, mut stream) = socket.split();
    debug!(target: "qa::delivery", "socket connected");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let topic = event.topic();
                let frame = match serde_json::to_string(&event) {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!(target: "qa::delivery", %topic, error = %err, "event not encodable");
                        continue;
                    }
                };
                if let Err(err) = sink.send(Message::Text(frame.into())).await {
                    warn!(target: "qa::delivery", %topic, error = %err, "socket delivery failed");
                    break;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!(target: "qa::delivery", "socket closed");
}
