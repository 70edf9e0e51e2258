//! Server configuration.

use std::time::Duration;

use pairplay_session::StoreConfig;

use crate::PairplayError;

/// Port used when neither `PAIRPLAY_BIND` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Settings for a [`PairplayServer`](crate::PairplayServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    ///
    /// Default: `0.0.0.0:3000`.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is closed and
    /// treated as a disconnect. Clients keep quiet connections alive
    /// with `Heartbeat`.
    ///
    /// Default: 60 seconds.
    pub idle_timeout: Duration,

    /// Session code generation settings.
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            idle_timeout: Duration::from_secs(60),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads overrides from the process environment.
    ///
    /// - `PAIRPLAY_BIND` — full bind address, e.g. `127.0.0.1:9000`
    /// - `PORT` — port on `0.0.0.0`, used when `PAIRPLAY_BIND` is unset
    /// - `PAIRPLAY_IDLE_TIMEOUT_SECS` — idle timeout in whole seconds
    ///
    /// # Errors
    /// Returns [`PairplayError::Config`] if a variable is set but can't be
    /// parsed.
    pub fn from_env() -> Result<Self, PairplayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PairplayError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("PAIRPLAY_BIND") {
            config.bind_addr = bind;
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| {
                PairplayError::Config(format!("PORT is not a port: {port:?}"))
            })?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }

        if let Some(secs) = lookup("PAIRPLAY_IDLE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                PairplayError::Config(format!(
                    "PAIRPLAY_IDLE_TIMEOUT_SECS is not a number: {secs:?}"
                ))
            })?;
            if secs == 0 {
                return Err(PairplayError::Config(
                    "PAIRPLAY_IDLE_TIMEOUT_SECS must be positive".into(),
                ));
            }
            config.idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
