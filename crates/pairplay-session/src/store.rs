//! The session store: every live session, keyed by code.
//!
//! # Concurrency note
//!
//! `SessionStore` is a plain `HashMap` with no locking. The server owns
//! one instance (inside the coordinator) behind a single mutex, which is
//! what serializes events for the same session.

use std::collections::HashMap;

use pairplay_protocol::SessionCode;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{Session, StoreError};

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Tuning for session code generation.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Characters per code.
    ///
    /// Default: 6 (62^6 ≈ 5.7e10 possible codes).
    pub code_length: usize,

    /// How many fresh codes `create` tries before giving up with
    /// [`StoreError::Collision`].
    ///
    /// Default: 16.
    pub max_code_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_code_attempts: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

/// Produces candidate session codes.
///
/// The store checks uniqueness; generators only need to produce
/// candidates. Any `FnMut(usize) -> SessionCode` closure is a generator,
/// which keeps tests deterministic.
pub trait CodeGenerator: Send + 'static {
    /// Returns a candidate code of `length` characters.
    fn generate(&mut self, length: usize) -> SessionCode;
}

impl<F> CodeGenerator for F
where
    F: FnMut(usize) -> SessionCode + Send + 'static,
{
    fn generate(&mut self, length: usize) -> SessionCode {
        self(length)
    }
}

/// Random `[A-Za-z0-9]` codes from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeGenerator for RandomCodes {
    fn generate(&mut self, length: usize) -> SessionCode {
        let code: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();
        SessionCode::from(code)
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Owns every live [`Session`].
///
/// ```text
/// create() ──→ [waiting] ──→ engine mutations via get_mut() ──→ remove()
/// ```
///
/// Constructed once at process start and owned by whoever serializes
/// access to it; there is no global session map.
pub struct SessionStore<G: CodeGenerator = RandomCodes> {
    sessions: HashMap<SessionCode, Session>,
    config: StoreConfig,
    generator: G,
}

impl SessionStore<RandomCodes> {
    /// Creates an empty store that generates random codes.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_generator(config, RandomCodes)
    }
}

impl Default for SessionStore<RandomCodes> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl<G: CodeGenerator> SessionStore<G> {
    /// Creates an empty store with a custom code generator.
    pub fn with_generator(config: StoreConfig, generator: G) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
            generator,
        }
    }

    /// Inserts a fresh session under a code that is not in use and
    /// returns that code.
    ///
    /// # Errors
    /// Returns [`StoreError::Collision`] if every candidate produced in
    /// `max_code_attempts` tries was already taken.
    pub fn create(&mut self) -> Result<SessionCode, StoreError> {
        for _ in 0..self.config.max_code_attempts {
            let code = self.generator.generate(self.config.code_length);
            if self.sessions.contains_key(&code) {
                tracing::debug!(%code, "session code collision, retrying");
                continue;
            }
            self.sessions
                .insert(code.clone(), Session::new(code.clone()));
            tracing::info!(%code, sessions = self.sessions.len(), "session created");
            return Ok(code);
        }

        tracing::warn!(
            attempts = self.config.max_code_attempts,
            "session code generation exhausted"
        );
        Err(StoreError::Collision {
            attempts: self.config.max_code_attempts,
        })
    }

    /// Looks up a session for reading.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] for unknown codes.
    pub fn get(&self, code: &SessionCode) -> Result<&Session, StoreError> {
        self.sessions
            .get(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))
    }

    /// Looks up a session for an engine transition.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] for unknown codes.
    pub fn get_mut(
        &mut self,
        code: &SessionCode,
    ) -> Result<&mut Session, StoreError> {
        self.sessions
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))
    }

    /// Deletes a session. Removing an absent code is not an error.
    pub fn remove(&mut self, code: &SessionCode) -> Option<Session> {
        let removed = self.sessions.remove(code);
        if removed.is_some() {
            tracing::info!(%code, sessions = self.sessions.len(), "session removed");
        }
        removed
    }

    pub fn contains(&self, code: &SessionCode) -> bool {
        self.sessions.contains_key(code)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Codes of every live session, in no particular order.
    pub fn codes(&self) -> Vec<SessionCode> {
        self.sessions.keys().cloned().collect()
    }
}

// =========================================================================
// Tests
// =========================================================================
