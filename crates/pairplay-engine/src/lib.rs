//! Game rules and event routing for pairplay.
//!
//! The engine turns inbound events into validated session transitions and
//! the outbound messages they produce. It does no I/O and no locking; the
//! server serializes calls by holding the [`Coordinator`] behind a mutex.
//!
//! # Key types
//!
//! - [`Engine`] — state machine operations on a single session
//! - [`Coordinator`] — resolves codes, tracks seats, addresses deliveries
//! - [`Outcome`] — snapshot plus events from a successful transition
//! - [`GameError`] — why an event was rejected

mod coordinator;
mod engine;
mod error;
pub mod rules;

pub use coordinator::{Coordinator, Delivery};
pub use engine::{Disposition, Engine, Outcome};
pub use error::GameError;
