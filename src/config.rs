//! Configuration module for the push listener.
//!
//! The listener is configured through two environment variables,
//! `LISTENER_HOST` and `LISTENER_PORT`. Anything missing falls back to the
//! defaults in [`crate::constants`].

use std::env;

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, ENV_LISTENER_HOST, ENV_LISTENER_PORT};
use crate::error::{ListenerError, Result};

/// Bind settings for the listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError::Config` for an unparsable or unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Unset keys take their defaults. The result is validated before it is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError::Config` if `LISTENER_PORT` is not a port
    /// number or validation fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(ENV_LISTENER_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(ENV_LISTENER_PORT) {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_PORT,
        };

        let config = Config { host, port };
        config.validate()?;

        Ok(config)
    }

    /// Rejects settings that cannot produce a reachable listener.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError::Config` for an empty host or port 0.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ListenerError::Config(format!(
                "{ENV_LISTENER_HOST} must not be empty"
            )));
        }

        // Port 0 would silently bind an ephemeral port nobody knows about.
        if self.port == 0 {
            return Err(ListenerError::Config(format!(
                "{ENV_LISTENER_PORT} must be between 1 and 65535"
            )));
        }

        Ok(())
    }

    /// `host:port` string handed to the socket layer.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.trim().parse::<u16>().map_err(|e| {
        ListenerError::Config(format!(
            "{ENV_LISTENER_PORT} must be an integer port, got {raw:?}: {e}"
        ))
    })
}
