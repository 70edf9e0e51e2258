//! The session state machine.
//!
//! ```text
//! Waiting ──(2nd join)──→ Active ──(win/draw)──→ Finished
//!    ↑                      ↑  ↑                     │
//!    └──(restart, 1 seat)───┘  └─────(restart)───────┘
//!
//! any state ──(last player leaves)──→ [removed from the store]
//! ```
//!
//! Every operation validates first and only then mutates, so a rejected
//! event leaves the session untouched. Successful operations return an
//! [`Outcome`]: the post-operation snapshot plus the messages to
//! broadcast to every seated player, in order.

use pairplay_protocol::{
    ConnectionId, Mark, ServerMessage, SessionStatus, SessionView, Winner,
};
use pairplay_session::{Player, Session};

use crate::GameError;
use crate::rules::{next_mark, winning_mark};

/// What the caller must do with the session after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep the session in the store.
    Retain,
    /// The last player left; delete the session.
    Remove,
}

/// The result of a successful engine operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Immutable snapshot taken after the transition.
    pub snapshot: SessionView,
    /// Messages for every seated player, in emission order.
    pub events: Vec<ServerMessage>,
    pub disposition: Disposition,
}

impl Outcome {
    fn retain(session: &Session, events: Vec<ServerMessage>) -> Self {
        Self {
            snapshot: Engine::snapshot(session),
            events,
            disposition: Disposition::Retain,
        }
    }
}

/// Stateless operations over a single [`Session`].
///
/// The engine does no locking and no I/O. Callers serialize events for
/// the same session.
pub struct Engine;

impl Engine {
    /// Seats `connection` under `display_name`.
    ///
    /// The first player gets `X`, the second `O` (or whichever mark is
    /// free if a player left). Emits `PlayerJoined`; when this join fills
    /// the second seat a fresh game starts and `GameStarted` follows.
    ///
    /// # Errors
    /// - [`GameError::InvalidName`] — blank display name
    /// - [`GameError::AlreadyInSession`] — the connection is already seated here
    /// - [`GameError::SessionFull`] — both seats taken
    pub fn join(
        session: &mut Session,
        connection: ConnectionId,
        display_name: &str,
    ) -> Result<Outcome, GameError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(GameError::InvalidName);
        }
        if session.is_seated(connection) {
            return Err(GameError::AlreadyInSession(
                connection,
                session.code.clone(),
            ));
        }
        if session.is_full() {
            return Err(GameError::SessionFull(session.code.clone()));
        }

        let mark = next_mark(&session.players);
        session.players.push(Player {
            connection_id: connection,
            display_name: display_name.to_string(),
            mark,
        });
        tracing::info!(
            code = %session.code,
            %connection,
            %mark,
            players = session.players.len(),
            "player joined"
        );

        let mut events = vec![ServerMessage::PlayerJoined {
            roster: session.roster(),
        }];

        if session.is_full() {
            Self::start_game(session);
            events.push(ServerMessage::GameStarted {
                first_turn: session.current_turn,
            });
        }

        Ok(Outcome::retain(session, events))
    }

    /// Places the requester's mark at `(row, col)`.
    ///
    /// A winning move or a move that fills the board finishes the game and
    /// emits `GameOver` without switching turns. Any other move hands the
    /// turn to the opponent and emits `GameStateUpdated`.
    ///
    /// # Errors
    /// - [`GameError::NotYourTurn`] — game not active, requester not
    ///   seated, or it is the other mark's turn
    /// - [`GameError::OutOfBounds`] — `row` or `col` outside `0..=2`
    /// - [`GameError::CellOccupied`] — the cell already holds a mark
    pub fn make_move(
        session: &mut Session,
        connection: ConnectionId,
        row: usize,
        col: usize,
    ) -> Result<Outcome, GameError> {
        if !session.status.accepts_moves() {
            return Err(GameError::NotYourTurn);
        }
        let mark = session
            .player(connection)
            .map(|p| p.mark)
            .ok_or(GameError::NotYourTurn)?;
        if mark != session.current_turn {
            return Err(GameError::NotYourTurn);
        }
        match session.board.get(row, col) {
            None => return Err(GameError::OutOfBounds { row, col }),
            Some(Some(_)) => return Err(GameError::CellOccupied { row, col }),
            Some(None) => {}
        }

        session.board.place(row, col, mark);

        let event = if let Some(winner) = winning_mark(&session.board) {
            Self::finish(session, Winner::from(winner))
        } else if session.board.is_full() {
            Self::finish(session, Winner::Draw)
        } else {
            session.current_turn = mark.opponent();
            ServerMessage::GameStateUpdated {
                board: session.board.view(),
                current_turn: session.current_turn,
            }
        };

        Ok(Outcome::retain(session, vec![event]))
    }

    /// Clears the board and starts over with `X` to move.
    ///
    /// Allowed from any status, including mid-game. The session becomes
    /// `Active` if both seats are filled and `Waiting` otherwise.
    pub fn restart(session: &mut Session) -> Outcome {
        session.board.clear();
        session.current_turn = Mark::X;
        session.winner = None;
        session.status = if session.is_full() {
            SessionStatus::Active
        } else {
            SessionStatus::Waiting
        };
        tracing::info!(code = %session.code, status = %session.status, "game restarted");

        let event = ServerMessage::GameRestarted {
            board: session.board.view(),
            current_turn: session.current_turn,
            status: session.status,
        };
        Outcome::retain(session, vec![event])
    }

    /// Removes the player seated on `connection`. Unknown connections are
    /// a no-op.
    ///
    /// If nobody is left the outcome asks for removal and carries no
    /// events. Otherwise the remaining player gets `PlayerLeft`; the game
    /// is not forfeited.
    pub fn leave(session: &mut Session, connection: ConnectionId) -> Outcome {
        let Some(index) = session
            .players
            .iter()
            .position(|p| p.connection_id == connection)
        else {
            return Outcome::retain(session, Vec::new());
        };

        let player = session.players.remove(index);
        tracing::info!(
            code = %session.code,
            %connection,
            players = session.players.len(),
            "player left"
        );

        if session.is_empty() {
            return Outcome {
                snapshot: Self::snapshot(session),
                events: Vec::new(),
                disposition: Disposition::Remove,
            };
        }

        let event = ServerMessage::PlayerLeft {
            display_name: player.display_name,
            roster: session.roster(),
        };
        Outcome::retain(session, vec![event])
    }

    /// Builds the wire-facing snapshot of a session.
    pub fn snapshot(session: &Session) -> SessionView {
        SessionView {
            code: session.code.clone(),
            board: session.board.view(),
            roster: session.roster(),
            current_turn: session.current_turn,
            status: session.status,
            winner: session.winner,
        }
    }

    fn start_game(session: &mut Session) {
        session.board.clear();
        session.winner = None;
        session.current_turn = Mark::X;
        session.status = SessionStatus::Active;
        tracing::info!(code = %session.code, "game started");
    }

    fn finish(session: &mut Session, winner: Winner) -> ServerMessage {
        session.status = SessionStatus::Finished;
        session.winner = Some(winner);
        tracing::info!(code = %session.code, ?winner, "game over");
        ServerMessage::GameOver {
            winner,
            board: session.board.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairplay_protocol::{CellView, SessionCode};

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    /// A session with two seated players: conn 1 plays X, conn 2 plays O.
    fn active_session() -> Session {
        let mut session = Session::new(SessionCode::new("t3st00"));
        Engine::join(&mut session, conn(1), "ana").unwrap();
        Engine::join(&mut session, conn(2), "bo").unwrap();
        session
    }

    // =====================================================================
    // join
    // =====================================================================

    #[test]
    fn test_first_join_gets_x_and_stays_waiting() {
        let mut session = Session::new(SessionCode::new("t3st00"));

        let outcome = Engine::join(&mut session, conn(1), "ana").unwrap();

        assert_eq!(session.players[0].mark, Mark::X);
        assert_eq!(session.status, SessionStatus::Waiting);
        assert_eq!(outcome.events.len(), 1);
        assert!(matches!(
            &outcome.events[0],
            ServerMessage::PlayerJoined { roster } if roster.len() == 1
        ));
    }

    #[test]
    fn test_second_join_gets_o_and_starts_game() {
        let mut session = Session::new(SessionCode::new("t3st00"));
        Engine::join(&mut session, conn(1), "ana").unwrap();

        let outcome = Engine::join(&mut session, conn(2), "bo").unwrap();

        assert_eq!(session.players[1].mark, Mark::O);
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.current_turn, Mark::X);
        assert!(matches!(
            outcome.events.as_slice(),
            [
                ServerMessage::PlayerJoined { .. },
                ServerMessage::GameStarted { first_turn: Mark::X },
            ]
        ));
        assert_eq!(outcome.snapshot.status, SessionStatus::Active);
    }

    #[test]
    fn test_join_trims_display_name() {
        let mut session = Session::new(SessionCode::new("t3st00"));
        Engine::join(&mut session, conn(1), "  ana \n").unwrap();
        assert_eq!(session.players[0].display_name, "ana");
    }

    #[test]
    fn test_join_rejects_blank_name() {
        let mut session = Session::new(SessionCode::new("t3st00"));
        let result = Engine::join(&mut session, conn(1), "   ");
        assert!(matches!(result, Err(GameError::InvalidName)));
        assert!(session.players.is_empty());
    }

    #[test]
    fn test_join_rejects_same_connection_twice() {
        let mut session = Session::new(SessionCode::new("t3st00"));
        Engine::join(&mut session, conn(1), "ana").unwrap();

        let result = Engine::join(&mut session, conn(1), "ana again");

        assert!(matches!(result, Err(GameError::AlreadyInSession(c, _)) if c == conn(1)));
        assert_eq!(session.players.len(), 1);
    }

    #[test]
    fn test_rejoin_after_departure_takes_free_mark() {
        let mut session = active_session();
        Engine::leave(&mut session, conn(1)); // X leaves

        Engine::join(&mut session, conn(3), "cy").unwrap();

        let marks: Vec<_> = session.players.iter().map(|p| p.mark).collect();
        assert_eq!(marks, [Mark::O, Mark::X]);
    }

    #[test]
    fn test_refilling_seat_starts_fresh_game() {
        let mut session = active_session();
        Engine::make_move(&mut session, conn(1), 0, 0).unwrap();
        Engine::make_move(&mut session, conn(2), 1, 1).unwrap();
        Engine::leave(&mut session, conn(2));

        let outcome = Engine::join(&mut session, conn(3), "cy").unwrap();

        assert!(session.board.is_empty());
        assert_eq!(session.current_turn, Mark::X);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(matches!(
            outcome.events.last(),
            Some(ServerMessage::GameStarted { first_turn: Mark::X })
        ));
    }

    // =====================================================================
    // make_move
    // =====================================================================

    #[test]
    fn test_move_writes_mark_and_switches_turn() {
        let mut session = active_session();

        let outcome = Engine::make_move(&mut session, conn(1), 1, 1).unwrap();

        assert_eq!(session.board.get(1, 1), Some(Some(Mark::X)));
        assert_eq!(session.current_turn, Mark::O);
        match &outcome.events[..] {
            [ServerMessage::GameStateUpdated { board, current_turn }] => {
                assert_eq!(board.cell(1, 1), Some(CellView::X));
                assert_eq!(*current_turn, Mark::O);
            }
            other => panic!("expected GameStateUpdated, got {other:?}"),
        }
    }

    #[test]
    fn test_move_before_game_starts_is_not_your_turn() {
        let mut session = Session::new(SessionCode::new("t3st00"));
        Engine::join(&mut session, conn(1), "ana").unwrap();

        let result = Engine::make_move(&mut session, conn(1), 0, 0);

        assert!(matches!(result, Err(GameError::NotYourTurn)));
        assert!(session.board.is_empty());
    }

    #[test]
    fn test_move_by_unseated_connection_is_not_your_turn() {
        let mut session = active_session();
        let result = Engine::make_move(&mut session, conn(9), 0, 0);
        assert!(matches!(result, Err(GameError::NotYourTurn)));
    }

    #[test]
    fn test_out_of_bounds_checked_before_touching_board() {
        let mut session = active_session();

        for (row, col) in [(3, 0), (0, 3), (usize::MAX, 1)] {
            let result = Engine::make_move(&mut session, conn(1), row, col);
            assert!(
                matches!(result, Err(GameError::OutOfBounds { .. })),
                "({row}, {col}) should be out of bounds"
            );
        }
        assert!(session.board.is_empty());
        assert_eq!(session.current_turn, Mark::X);
    }

    #[test]
    fn test_move_after_game_over_is_rejected() {
        let mut session = active_session();
        for (who, row, col) in [(1, 0, 0), (2, 1, 0), (1, 0, 1), (2, 1, 1), (1, 0, 2)] {
            Engine::make_move(&mut session, conn(who), row, col).unwrap();
        }
        assert_eq!(session.status, SessionStatus::Finished);

        let result = Engine::make_move(&mut session, conn(2), 2, 2);

        assert!(matches!(result, Err(GameError::NotYourTurn)));
        assert_eq!(session.board.occupied(), 5);
    }

    #[test]
    fn test_winning_move_keeps_turn_and_sets_winner() {
        let mut session = active_session();
        for (who, row, col) in [(1, 0, 0), (2, 1, 0), (1, 0, 1), (2, 1, 1)] {
            Engine::make_move(&mut session, conn(who), row, col).unwrap();
        }

        let outcome = Engine::make_move(&mut session, conn(1), 0, 2).unwrap();

        assert_eq!(session.current_turn, Mark::X, "no turn switch on win");
        assert_eq!(session.winner, Some(Winner::X));
        assert_eq!(outcome.snapshot.winner, Some(Winner::X));
        assert!(matches!(
            outcome.events.as_slice(),
            [ServerMessage::GameOver { winner: Winner::X, .. }]
        ));
    }

    // =====================================================================
    // restart / leave / snapshot
    // =====================================================================

    #[test]
    fn test_restart_with_one_player_waits() {
        let mut session = active_session();
        Engine::leave(&mut session, conn(2));

        let outcome = Engine::restart(&mut session);

        assert_eq!(session.status, SessionStatus::Waiting);
        assert!(matches!(
            outcome.events.as_slice(),
            [ServerMessage::GameRestarted { status: SessionStatus::Waiting, .. }]
        ));
    }

    #[test]
    fn test_leave_unknown_connection_is_noop() {
        let mut session = active_session();

        let outcome = Engine::leave(&mut session, conn(42));

        assert_eq!(session.players.len(), 2);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.disposition, Disposition::Retain);
    }

    #[test]
    fn test_leave_keeps_status_and_reports_roster() {
        let mut session = active_session();

        let outcome = Engine::leave(&mut session, conn(1));

        assert_eq!(session.status, SessionStatus::Active, "no forfeit");
        assert!(session.winner.is_none());
        match &outcome.events[..] {
            [ServerMessage::PlayerLeft { display_name, roster }] => {
                assert_eq!(display_name, "ana");
                assert_eq!(roster.len(), 1);
                assert_eq!(roster[0].display_name, "bo");
            }
            other => panic!("expected PlayerLeft, got {other:?}"),
        }
    }

    #[test]
    fn test_last_leave_requests_removal() {
        let mut session = Session::new(SessionCode::new("t3st00"));
        Engine::join(&mut session, conn(1), "ana").unwrap();

        let outcome = Engine::leave(&mut session, conn(1));

        assert_eq!(outcome.disposition, Disposition::Remove);
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached_from_session() {
        let mut session = active_session();
        let before = Engine::snapshot(&session);

        Engine::make_move(&mut session, conn(1), 2, 2).unwrap();

        assert_eq!(before.board.occupied(), 0);
        assert_eq!(before.current_turn, Mark::X);
        assert_eq!(before.roster.len(), 2);
    }
}
