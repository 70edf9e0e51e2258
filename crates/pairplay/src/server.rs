//! `PairplayServer` builder and server loop.
//!
//! This is the entry point for running a pairplay server. It ties the
//! layers together: transport → protocol → engine → session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use pairplay_engine::{Coordinator, Delivery};
use pairplay_protocol::{
    ClientMessage, Codec, ConnectionId, JsonCodec, ServerMessage,
};
use pairplay_session::SessionStore;
use pairplay_transport::{Transport, WebSocketTransport};
use tokio::sync::{Mutex, mpsc};

use crate::handler::handle_connection;
use crate::{PairplayError, ServerConfig};

/// Outbound queue of one connection. The connection's writer task owns
/// the receiving end.
pub(crate) type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Shared server state passed to each connection handler task.
///
/// Lock order is `coordinator` then `outboxes`. Neither lock is held
/// across a socket write: deliveries only enqueue onto outboxes.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) coordinator: Mutex<Coordinator>,
    pub(crate) outboxes: Mutex<HashMap<ConnectionId, Outbox>>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
    started: Instant,
}

impl<C: Codec> ServerState<C> {
    fn new(config: ServerConfig, codec: C) -> Self {
        let store = SessionStore::new(config.store.clone());
        Self {
            coordinator: Mutex::new(Coordinator::new(store)),
            outboxes: Mutex::new(HashMap::new()),
            codec,
            config,
            started: Instant::now(),
        }
    }

    /// Milliseconds since the server started.
    pub(crate) fn server_time(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub(crate) async fn register(&self, connection: ConnectionId, outbox: Outbox) {
        self.outboxes.lock().await.insert(connection, outbox);
    }

    /// Runs one inbound message through the coordinator and queues the
    /// resulting deliveries.
    ///
    /// The coordinator lock is held until every delivery is queued, so
    /// each recipient sees a session's events in the order they happened.
    pub(crate) async fn handle(
        &self,
        connection: ConnectionId,
        msg: ClientMessage,
    ) {
        let mut coordinator = self.coordinator.lock().await;
        let deliveries = coordinator.handle(connection, msg);
        self.dispatch(deliveries).await;
    }

    /// Frees the connection's seat, tells the other player, and drops the
    /// connection's outbox.
    pub(crate) async fn disconnect(&self, connection: ConnectionId) {
        {
            let mut coordinator = self.coordinator.lock().await;
            let deliveries = coordinator.disconnect(connection);
            self.dispatch(deliveries).await;
        }
        self.outboxes.lock().await.remove(&connection);
        tracing::debug!(%connection, "connection cleaned up");
    }

    /// Queues a message for one connection, outside any session.
    pub(crate) async fn notify(
        &self,
        connection: ConnectionId,
        message: ServerMessage,
    ) {
        self.dispatch(vec![Delivery::unicast(connection, message)])
            .await;
    }

    async fn dispatch(&self, deliveries: Vec<Delivery>) {
        if deliveries.is_empty() {
            return;
        }
        let outboxes = self.outboxes.lock().await;
        for delivery in deliveries {
            for to in &delivery.to {
                let Some(outbox) = outboxes.get(to) else {
                    tracing::debug!(connection = %to, "no outbox, dropping message");
                    continue;
                };
                // A closed outbox means the writer already exited; its
                // handler's disconnect cleans up.
                let _ = outbox.send(delivery.message.clone());
            }
        }
    }
}

/// Builder for configuring and starting a pairplay server.
///
/// # Example
///
/// ```rust,ignore
/// use pairplay::prelude::*;
///
/// let server = PairplayServer::builder()
///     .bind("127.0.0.1:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct PairplayServerBuilder {
    config: ServerConfig,
}

impl PairplayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<PairplayServer<JsonCodec>, PairplayError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let state = Arc::new(ServerState::new(self.config, JsonCodec));
        Ok(PairplayServer { transport, state })
    }
}

impl Default for PairplayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound pairplay server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PairplayServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PairplayServer {
    /// Creates a new builder.
    pub fn builder() -> PairplayServerBuilder {
        PairplayServerBuilder::new()
    }
}

impl<C: Codec> PairplayServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), PairplayError> {
        tracing::info!(
            addr = %self.config_addr(),
            idle_timeout = ?self.state.config.idle_timeout,
            "pairplay server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }

    fn config_addr(&self) -> String {
        self.local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| self.state.config.bind_addr.clone())
    }
}
