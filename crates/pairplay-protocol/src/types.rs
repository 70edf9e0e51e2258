//! Core protocol types for pairplay's wire format.
//!
//! Everything in this module travels "on the wire": it is what clients
//! send to the server and what the server pushes back. Internal session
//! state lives in `pairplay-session`; the `*View` types here are the
//! immutable snapshots built from it before anything is sent.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The short code that addresses a session (e.g. `"a9Xk2Q"`).
///
/// Codes are generated by the session store and are unique among live
/// sessions. `#[serde(transparent)]` keeps the JSON form a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(String);

impl SessionCode {
    /// Wraps a raw code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for SessionCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

// ---------------------------------------------------------------------------
// Marks, cells, outcomes
// ---------------------------------------------------------------------------

/// A player's symbol. The first player to join a session plays `X`,
/// the second plays `O`. `X` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::O => f.write_str("O"),
        }
    }
}

/// One cell of a board snapshot. Empty cells serialize as `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl From<Option<Mark>> for CellView {
    fn from(cell: Option<Mark>) -> Self {
        match cell {
            None => Self::Empty,
            Some(Mark::X) => Self::X,
            Some(Mark::O) => Self::O,
        }
    }
}

/// A full 3x3 board snapshot, row-major: `board.0[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardView(pub [[CellView; 3]; 3]);

impl BoardView {
    /// Returns the cell at `(row, col)`, or `None` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<CellView> {
        self.0.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|c| **c != CellView::Empty)
            .count()
    }
}

/// How a finished game ended: a winning mark or a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl Winner {
    /// Returns the winning mark, or `None` for a draw.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Self::X => Some(Mark::X),
            Self::O => Some(Mark::O),
            Self::Draw => None,
        }
    }
}

impl From<Mark> for Winner {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Self::X,
            Mark::O => Self::O,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
/// Waiting ──(2nd join)──→ Active ──(win/draw)──→ Finished
///                            ↑                       │
///                            └──────(restart)────────┘
/// ```
///
/// A restart with fewer than two players seated lands in `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Waiting,
    Active,
    Finished,
}

impl SessionStatus {
    /// Returns `true` if moves are accepted in this state.
    pub fn accepts_moves(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A seated player as clients see them. Connection handles stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub display_name: String,
    pub mark: Mark,
}

/// An immutable snapshot of one session, built after every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub code: SessionCode,
    pub board: BoardView,
    pub roster: Vec<PlayerView>,
    pub current_turn: Mark,
    pub status: SessionStatus,
    pub winner: Option<Winner>,
}

// ---------------------------------------------------------------------------
// Errors reported to clients
// ---------------------------------------------------------------------------

/// The kind of failure reported in [`ServerMessage::ErrorNotified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    SessionNotFound,
    SessionFull,
    NotYourTurn,
    CellOccupied,
    OutOfBounds,
    CollisionError,
    /// The connection is already seated in a session.
    AlreadyInSession,
    /// The display name was blank.
    InvalidName,
    /// The frame could not be decoded as a client message.
    InvalidMessage,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Messages clients send to the server.
///
/// `#[serde(tag = "type")]` gives the internally tagged form:
/// `{ "type": "MakeMove", "code": "a9Xk2Q", "row": 1, "col": 2 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Create a session and take its first seat.
    CreateSession { display_name: String },

    /// Take a seat in an existing session.
    JoinSession {
        code: SessionCode,
        display_name: String,
    },

    /// Place the sender's mark at `(row, col)`.
    MakeMove {
        code: SessionCode,
        row: usize,
        col: usize,
    },

    /// Clear the board and start over.
    RestartSession { code: SessionCode },

    /// Give up the sender's seat without closing the connection.
    LeaveSession,

    /// Keep-alive. Answered with [`ServerMessage::HeartbeatAck`].
    Heartbeat { client_time: u64 },
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Unicast to the creator.
    SessionCreated { code: SessionCode },

    /// Unicast to a player right after they are seated.
    PlayerAssigned {
        mark: Mark,
        display_name: String,
        current_turn: Mark,
    },

    /// Broadcast on every successful join.
    PlayerJoined { roster: Vec<PlayerView> },

    /// Broadcast once the second player is seated.
    GameStarted { first_turn: Mark },

    /// Broadcast after every non-terminal move.
    GameStateUpdated {
        board: BoardView,
        current_turn: Mark,
    },

    /// Broadcast on the move that wins or fills the board.
    GameOver { winner: Winner, board: BoardView },

    /// Broadcast after a restart.
    GameRestarted {
        board: BoardView,
        current_turn: Mark,
        status: SessionStatus,
    },

    /// Broadcast to the remaining member when a player leaves.
    PlayerLeft {
        display_name: String,
        roster: Vec<PlayerView>,
    },

    /// Unicast reply to a heartbeat. `server_time` is milliseconds since
    /// the server started.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Unicast to the requester whose operation failed.
    ErrorNotified { kind: ErrorKind, message: String },
}

// =========================================================================
// Tests
// =========================================================================
