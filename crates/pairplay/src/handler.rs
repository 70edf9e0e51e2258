//! Per-connection handler: decode, route, and write back.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbox. The flow is:
//!   1. Register an outbox so deliveries can reach this connection
//!   2. Loop: receive frames → decode `ClientMessage` → coordinator
//!   3. On close, error, or idle timeout, the drop guard frees the seat

use std::sync::Arc;

use pairplay_protocol::{ClientMessage, Codec, ErrorKind, ServerMessage};
use pairplay_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::PairplayError;
use crate::server::ServerState;

/// Drop guard that disconnects a connection when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct DisconnectGuard<C: Codec> {
    connection: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let connection = self.connection;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.disconnect(connection).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PairplayError> {
    let connection = conn.id();
    tracing::debug!(%connection, peer = %conn.peer_addr(), "handling new connection");

    let conn = Arc::new(conn);
    let (tx, rx) = mpsc::unbounded_channel();
    state.register(connection, tx).await;
    let _guard = DisconnectGuard {
        connection,
        state: Arc::clone(&state),
    };
    tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), rx));

    loop {
        let data = match tokio::time::timeout(
            state.config.idle_timeout,
            conn.recv(),
        )
        .await
        {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%connection, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::info!(%connection, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%connection, error = %e, "failed to decode message");
                let error = ServerMessage::ErrorNotified {
                    kind: ErrorKind::InvalidMessage,
                    message: e.to_string(),
                };
                state.notify(connection, error).await;
                continue;
            }
        };

        match msg {
            ClientMessage::Heartbeat { client_time } => {
                let ack = ServerMessage::HeartbeatAck {
                    client_time,
                    server_time: state.server_time(),
                };
                state.notify(connection, ack).await;
            }
            other => state.handle(connection, other).await,
        }
    }

    // _guard drops here → seat freed, outbox dropped, writer exits.
    Ok(())
}

/// Drains the outbox onto the socket as text frames.
///
/// Ends when the outbox is dropped (disconnect) or a write fails.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut outbox: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let connection = conn.id();
    while let Some(msg) = outbox.recv().await {
        let text = match state.codec.encode_text(&msg) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%connection, error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send_text(&text).await {
            tracing::debug!(%connection, error = %e, "write failed");
            break;
        }
    }
}
