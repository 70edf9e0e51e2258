//! Session types: one game's full state.

use pairplay_protocol::{
    ConnectionId, Mark, PlayerView, SessionCode, SessionStatus, Winner,
};

use crate::Board;

/// Seats per session.
pub const MAX_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A seated player.
///
/// The session only holds the connection handle; the transport owns the
/// connection itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub connection_id: ConnectionId,
    pub display_name: String,
    /// Assigned on join and never changed afterwards.
    pub mark: Mark,
}

impl Player {
    pub fn view(&self) -> PlayerView {
        PlayerView {
            display_name: self.display_name.clone(),
            mark: self.mark,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One game between at most two players, addressed by a short code.
///
/// Sessions are created and destroyed by the
/// [`SessionStore`](crate::SessionStore); the engine mutates them. Fields
/// are public so the engine can apply validated transitions, and nothing
/// else should write to them.
#[derive(Debug, Clone)]
pub struct Session {
    pub code: SessionCode,
    pub board: Board,
    /// Join order. Never longer than [`MAX_PLAYERS`].
    pub players: Vec<Player>,
    pub current_turn: Mark,
    pub status: SessionStatus,
    /// Set only while `status` is `Finished`.
    pub winner: Option<Winner>,
}

impl Session {
    /// A fresh session: empty board, no players, waiting, `X` to move.
    pub fn new(code: SessionCode) -> Self {
        Self {
            code,
            board: Board::new(),
            players: Vec::with_capacity(MAX_PLAYERS),
            current_turn: Mark::X,
            status: SessionStatus::Waiting,
            winner: None,
        }
    }

    /// Looks up the player seated on `connection`.
    pub fn player(&self, connection: ConnectionId) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.connection_id == connection)
    }

    pub fn is_seated(&self, connection: ConnectionId) -> bool {
        self.player(connection).is_some()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Connection handles of every seated player, in join order.
    pub fn members(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.connection_id).collect()
    }

    /// The wire roster, in join order.
    pub fn roster(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(session: &mut Session, id: u64, name: &str, mark: Mark) {
        session.players.push(Player {
            connection_id: ConnectionId::new(id),
            display_name: name.into(),
            mark,
        });
    }

    #[test]
    fn test_new_session_is_waiting_and_empty() {
        let session = Session::new(SessionCode::new("abc123"));
        assert_eq!(session.status, SessionStatus::Waiting);
        assert_eq!(session.current_turn, Mark::X);
        assert!(session.board.is_empty());
        assert!(session.is_empty());
        assert!(session.winner.is_none());
    }

    #[test]
    fn test_player_lookup_by_connection() {
        let mut session = Session::new(SessionCode::new("abc123"));
        seat(&mut session, 1, "ana", Mark::X);
        seat(&mut session, 2, "bo", Mark::O);

        assert_eq!(
            session.player(ConnectionId::new(2)).map(|p| p.mark),
            Some(Mark::O)
        );
        assert!(!session.is_seated(ConnectionId::new(3)));
        assert!(session.is_full());
    }

    #[test]
    fn test_members_and_roster_keep_join_order() {
        let mut session = Session::new(SessionCode::new("abc123"));
        seat(&mut session, 7, "ana", Mark::X);
        seat(&mut session, 3, "bo", Mark::O);

        assert_eq!(
            session.members(),
            vec![ConnectionId::new(7), ConnectionId::new(3)]
        );
        let names: Vec<_> = session
            .roster()
            .into_iter()
            .map(|p| p.display_name)
            .collect();
        assert_eq!(names, ["ana", "bo"]);
    }
}
