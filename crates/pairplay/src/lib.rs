//! # pairplay
//!
//! A server for two-player tic-tac-toe sessions over WebSocket.
//!
//! Clients create a session, share its short code, and play against
//! whoever joins with that code. The server is authoritative: every move
//! is validated against the session's board and turn, and every accepted
//! change is broadcast to both players.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pairplay::prelude::*;
//!
//! # async fn start() -> Result<(), PairplayError> {
//! let server = PairplayServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::PairplayError;
pub use server::{PairplayServer, PairplayServerBuilder};

pub mod prelude {
    pub use crate::{
        PairplayError, PairplayServer, PairplayServerBuilder, ServerConfig,
    };
    pub use pairplay_engine::{Coordinator, Delivery, GameError};
    pub use pairplay_protocol::{
        BoardView, CellView, ClientMessage, Codec, ConnectionId, ErrorKind,
        JsonCodec, Mark, PlayerView, ServerMessage, SessionCode,
        SessionStatus, Winner,
    };
    pub use pairplay_session::{SessionStore, StoreConfig};
}
