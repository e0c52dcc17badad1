//! Websocket sessions fed by the fanout hub.
//!
//! Each session forwards every published message as a JSON text frame
//! `{"event": ..., "data": ...}`. Client frames are ignored apart from close.

use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use log::{debug, info, warn};
use sorter_core::{FanoutMessage, FanoutSubscription};
use uuid::Uuid;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    // Subscribe before the upgrade completes so nothing published after the
    // handshake is missed.
    let subscription = state.fanout.subscribe();
    ws.on_upgrade(move |socket| run_session(socket, subscription))
}

async fn run_session(mut socket: WebSocket, mut subscription: FanoutSubscription) {
    let session_id = Uuid::new_v4();
    info!("event=ws_session module=realtime status=open session_id={session_id}");

    loop {
        tokio::select! {
            message = subscription.recv() => {
                let Some(message) = message else {
                    break;
                };
                if let Err(err) = forward(&mut socket, &message).await {
                    debug!(
                        "event=ws_send module=realtime status=error session_id={session_id} error={err}"
                    );
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                None | Some(Ok(Message::Close(_))) => break,
                Some(Err(err)) => {
                    debug!(
                        "event=ws_recv module=realtime status=error session_id={session_id} error={err}"
                    );
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    info!("event=ws_session module=realtime status=closed session_id={session_id}");
}

async fn forward(socket: &mut WebSocket, message: &FanoutMessage) -> Result<(), axum::Error> {
    let frame = match serde_json::to_string(message) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(
                "event=ws_encode module=realtime status=error topic={} error={err}",
                message.event.as_str()
            );
            return Ok(());
        }
    };
    socket.send(Message::Text(frame.into())).await
}
