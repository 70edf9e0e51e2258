//! Unified error type for the pairplay server.

use pairplay_engine::GameError;
use pairplay_protocol::ProtocolError;
use pairplay_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PairplayError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rejected game event (store lookup, rule violation).
    #[error(transparent)]
    Game(#[from] GameError),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}
