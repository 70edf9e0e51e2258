//! Session storage for pairplay.
//!
//! This crate owns the data: every live [`Session`] (board, seated
//! players, turn, status) keyed by its [`SessionCode`]. It does not
//! decide whether a move is legal; that is the engine's job. Operations
//! here are deterministic apart from code generation, which is
//! pluggable through [`CodeGenerator`].
//!
//! ```text
//! Engine (above)  ← validates events, mutates sessions through the store
//!     ↕
//! Session Store (this crate)  ← owns the code → Session map
//!     ↕
//! Protocol (below)  ← Mark, SessionCode, view types
//! ```
//!
//! [`SessionCode`]: pairplay_protocol::SessionCode

mod board;
mod error;
mod session;
mod store;

pub use board::{Board, BOARD_SIZE};
pub use error::StoreError;
pub use session::{Player, Session, MAX_PLAYERS};
pub use store::{CodeGenerator, RandomCodes, SessionStore, StoreConfig};
