//! Coordinator: routes inbound client messages to sessions and decides
//! who receives each outbound message.
//!
//! This is the entry point for the server's connection handlers. It owns
//! the [`SessionStore`] and an index of which connection sits in which
//! session, runs the [`Engine`] on the resolved session, and turns the
//! resulting events into [`Delivery`]s with concrete recipients.

use std::collections::HashMap;

use pairplay_protocol::{
    ClientMessage, ConnectionId, ErrorKind, ServerMessage, SessionCode,
};
use pairplay_session::{CodeGenerator, RandomCodes, Session, SessionStore};

use crate::{Disposition, Engine, GameError, Outcome};

/// One outbound message and the connections it goes to.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: Vec<ConnectionId>,
    pub message: ServerMessage,
}

impl Delivery {
    /// A message for a single connection.
    pub fn unicast(to: ConnectionId, message: ServerMessage) -> Self {
        Self {
            to: vec![to],
            message,
        }
    }

    /// An `ErrorNotified` for a single connection.
    pub fn error(
        to: ConnectionId,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::unicast(
            to,
            ServerMessage::ErrorNotified {
                kind,
                message: message.into(),
            },
        )
    }
}

/// Owns every session and the connection → session index.
///
/// A connection sits in at most one session at a time (key invariant).
pub struct Coordinator<G: CodeGenerator = RandomCodes> {
    store: SessionStore<G>,
    seats: HashMap<ConnectionId, SessionCode>,
}

impl Default for Coordinator<RandomCodes> {
    fn default() -> Self {
        Self::new(SessionStore::default())
    }
}

impl<G: CodeGenerator> Coordinator<G> {
    pub fn new(store: SessionStore<G>) -> Self {
        Self {
            store,
            seats: HashMap::new(),
        }
    }

    /// Handles one inbound message from `connection`.
    ///
    /// Never fails: a rejected request becomes a single `ErrorNotified`
    /// delivered only to the requester. Heartbeats are answered by the
    /// transport layer and produce nothing here.
    pub fn handle(
        &mut self,
        connection: ConnectionId,
        msg: ClientMessage,
    ) -> Vec<Delivery> {
        let result = match msg {
            ClientMessage::CreateSession { display_name } => {
                self.create_session(connection, &display_name)
            }
            ClientMessage::JoinSession { code, display_name } => {
                self.join_session(connection, &code, &display_name)
            }
            ClientMessage::MakeMove { code, row, col } => {
                self.make_move(connection, &code, row, col)
            }
            ClientMessage::RestartSession { code } => {
                self.restart_session(connection, &code)
            }
            ClientMessage::LeaveSession => Ok(self.leave_session(connection)),
            ClientMessage::Heartbeat { .. } => Ok(Vec::new()),
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(%connection, error = %err, "request rejected");
            vec![Delivery::error(connection, err.kind(), err.to_string())]
        })
    }

    /// Creates a session and seats its creator.
    ///
    /// Replies `SessionCreated` to the creator, then behaves like
    /// [`join_session`](Self::join_session).
    ///
    /// # Errors
    /// - [`GameError::InvalidName`] / [`GameError::AlreadyInSession`] —
    ///   checked before anything is created
    /// - [`GameError::Store`] with `Collision` — no free code
    pub fn create_session(
        &mut self,
        connection: ConnectionId,
        display_name: &str,
    ) -> Result<Vec<Delivery>, GameError> {
        if display_name.trim().is_empty() {
            return Err(GameError::InvalidName);
        }
        self.ensure_unseated(connection)?;

        let code = self.store.create()?;
        let mut deliveries = vec![Delivery::unicast(
            connection,
            ServerMessage::SessionCreated { code: code.clone() },
        )];

        match self.seat(connection, &code, display_name) {
            Ok(more) => deliveries.extend(more),
            Err(err) => {
                // Never keep a session nobody sits in.
                self.store.remove(&code);
                return Err(err);
            }
        }
        Ok(deliveries)
    }

    /// Seats `connection` in the session `code`.
    ///
    /// The joiner first gets a `PlayerAssigned` with their mark, then
    /// every member (joiner included) gets `PlayerJoined` and, if the game
    /// just started, `GameStarted`.
    ///
    /// # Errors
    /// - [`GameError::AlreadyInSession`] — the connection holds a seat
    /// - [`GameError::Store`] with `NotFound` — unknown code
    /// - [`GameError::SessionFull`] / [`GameError::InvalidName`]
    pub fn join_session(
        &mut self,
        connection: ConnectionId,
        code: &SessionCode,
        display_name: &str,
    ) -> Result<Vec<Delivery>, GameError> {
        self.ensure_unseated(connection)?;
        self.seat(connection, code, display_name)
    }

    /// Applies a move for `connection` in session `code`.
    ///
    /// # Errors
    /// [`GameError::Store`] with `NotFound`, or any rule violation from
    /// [`Engine::make_move`].
    pub fn make_move(
        &mut self,
        connection: ConnectionId,
        code: &SessionCode,
        row: usize,
        col: usize,
    ) -> Result<Vec<Delivery>, GameError> {
        let session = self.store.get_mut(code)?;
        let outcome = Engine::make_move(session, connection, row, col)?;
        Ok(broadcast(session, outcome))
    }

    /// Restarts session `code`.
    ///
    /// Any connection that knows the code may restart, seated or not, and
    /// in any status.
    ///
    /// # Errors
    /// [`GameError::Store`] with `NotFound`.
    pub fn restart_session(
        &mut self,
        connection: ConnectionId,
        code: &SessionCode,
    ) -> Result<Vec<Delivery>, GameError> {
        let session = self.store.get_mut(code)?;
        tracing::debug!(%code, %connection, "restart requested");
        let outcome = Engine::restart(session);
        Ok(broadcast(session, outcome))
    }

    /// Gives up the seat held by `connection`, if any.
    ///
    /// The remaining member gets `PlayerLeft`; if nobody remains the
    /// session is deleted from the store.
    pub fn leave_session(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        let Some(code) = self.seats.remove(&connection) else {
            return Vec::new();
        };
        let Ok(session) = self.store.get_mut(&code) else {
            return Vec::new();
        };

        let outcome = Engine::leave(session, connection);
        match outcome.disposition {
            Disposition::Remove => {
                self.store.remove(&code);
                Vec::new()
            }
            Disposition::Retain => broadcast(session, outcome),
        }
    }

    /// The transport saw `connection` go away.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        if let Some(code) = self.seats.get(&connection) {
            tracing::info!(%connection, %code, "seated connection dropped");
        }
        self.leave_session(connection)
    }

    /// The session `connection` is seated in, if any.
    pub fn session_of(&self, connection: ConnectionId) -> Option<&SessionCode> {
        self.seats.get(&connection)
    }

    /// Read-only access to a live session.
    ///
    /// # Errors
    /// [`GameError::Store`] with `NotFound`.
    pub fn session(&self, code: &SessionCode) -> Result<&Session, GameError> {
        Ok(self.store.get(code)?)
    }

    pub fn store(&self) -> &SessionStore<G> {
        &self.store
    }

    fn ensure_unseated(&self, connection: ConnectionId) -> Result<(), GameError> {
        match self.seats.get(&connection) {
            Some(code) => {
                Err(GameError::AlreadyInSession(connection, code.clone()))
            }
            None => Ok(()),
        }
    }

    fn seat(
        &mut self,
        connection: ConnectionId,
        code: &SessionCode,
        display_name: &str,
    ) -> Result<Vec<Delivery>, GameError> {
        let session = self.store.get_mut(code)?;
        let outcome = Engine::join(session, connection, display_name)?;
        self.seats.insert(connection, code.clone());

        let assigned = session
            .player(connection)
            .map(|p| ServerMessage::PlayerAssigned {
                mark: p.mark,
                display_name: p.display_name.clone(),
                current_turn: session.current_turn,
            });

        let mut deliveries = Vec::with_capacity(outcome.events.len() + 1);
        if let Some(msg) = assigned {
            deliveries.push(Delivery::unicast(connection, msg));
        }
        deliveries.extend(broadcast(session, outcome));
        Ok(deliveries)
    }
}

/// Addresses every event in `outcome` to the session's current members.
fn broadcast(session: &Session, outcome: Outcome) -> Vec<Delivery> {
    let members = session.members();
    outcome
        .events
        .into_iter()
        .map(|message| Delivery {
            to: members.clone(),
            message,
        })
        .collect()
}
