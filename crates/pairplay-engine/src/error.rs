//! Error types for the engine layer.

use pairplay_protocol::{ConnectionId, ErrorKind, SessionCode};
use pairplay_session::StoreError;

/// Why an inbound event was rejected.
///
/// Every variant is local to one request: the session is left exactly as
/// it was, and the error goes back to the requester only.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Lookup or creation in the session store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Both seats are taken.
    #[error("session {0} is full")]
    SessionFull(SessionCode),

    /// The game is not running, the requester is not seated, or it is
    /// the other mark's turn.
    #[error("not your turn")]
    NotYourTurn,

    /// The target cell already holds a mark.
    #[error("cell ({row}, {col}) is occupied")]
    CellOccupied { row: usize, col: usize },

    /// The target cell is off the 3x3 board.
    #[error("cell ({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },

    /// The connection already holds a seat.
    #[error("{0} is already in session {1}")]
    AlreadyInSession(ConnectionId, SessionCode),

    /// The display name is empty or whitespace.
    #[error("display name must not be empty")]
    InvalidName,
}

impl GameError {
    /// The kind reported to the client in `ErrorNotified`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(StoreError::NotFound(_)) => ErrorKind::SessionNotFound,
            Self::Store(StoreError::Collision { .. }) => ErrorKind::CollisionError,
            Self::SessionFull(_) => ErrorKind::SessionFull,
            Self::NotYourTurn => ErrorKind::NotYourTurn,
            Self::CellOccupied { .. } => ErrorKind::CellOccupied,
            Self::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            Self::AlreadyInSession(..) => ErrorKind::AlreadyInSession,
            Self::InvalidName => ErrorKind::InvalidName,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_wire_kinds() {
        let not_found: GameError =
            StoreError::NotFound(SessionCode::new("zzz999")).into();
        assert_eq!(not_found.kind(), ErrorKind::SessionNotFound);
        assert!(not_found.to_string().contains("zzz999"));

        let collision: GameError = StoreError::Collision { attempts: 4 }.into();
        assert_eq!(collision.kind(), ErrorKind::CollisionError);
    }

    #[test]
    fn test_cell_errors_carry_coordinates() {
        let err = GameError::CellOccupied { row: 2, col: 1 };
        assert_eq!(err.kind(), ErrorKind::CellOccupied);
        assert_eq!(err.to_string(), "cell (2, 1) is occupied");
    }
}
