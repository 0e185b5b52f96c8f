use crate::server::RelayState;
use crate::transport::ConnectionSession;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<RelayState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (session, mut outbound_rx) = ConnectionSession::new(state.config.outbound_capacity);
    let session_id = session.id();
    info!("New WebSocket connection: {}", session_id);

    let (mut sender, mut receiver) = socket.split();
    let send_timeout = state.config.send_timeout;

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            let write = sender.send(Message::Text(text.to_string().into()));
            match tokio::time::timeout(send_timeout, write).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!("Write to {} failed: {}", session_id, e);
                    break;
                }
                Err(_) => {
                    warn!("Write to {} stalled for {:?}, dropping connection", session_id, send_timeout);
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = state.relay.clone();
        let session = session.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        if let Err(e) = relay.handle_text(&session, text.as_str()).await {
                            error!("Relay unavailable: {}", e);
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    drop(session);
    if let Err(e) = state.relay.disconnect(session_id).await {
        error!("Cleanup for {} failed: {}", session_id, e);
    }
    info!("WebSocket disconnected: {}", session_id);
}
