//! Error types for the session store.

use pairplay_protocol::SessionCode;

/// Errors returned by [`SessionStore`](crate::SessionStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No live session has this code.
    #[error("session {0} not found")]
    NotFound(SessionCode),

    /// Code generation kept producing codes that are already in use.
    /// With the default 62^6 code space this practically never happens.
    #[error("no free session code after {attempts} attempts")]
    Collision { attempts: u32 },
}
