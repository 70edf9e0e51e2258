//! Wire protocol for pairplay.
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Mark`],
//!   [`SessionView`], ...) — what travels between clients and the server.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   turned into frames and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Engine (session state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BoardView, CellView, ClientMessage, ErrorKind, Mark, PlayerView,
    ServerMessage, SessionCode, SessionStatus, SessionView, Winner,
};

/// Re-exported so layers above the transport can name connections
/// without depending on it directly.
pub use pairplay_transport::ConnectionId;
