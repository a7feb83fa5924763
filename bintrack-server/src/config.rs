//! Server configuration read from the environment.

use std::env;
use std::net::SocketAddr;

use anyhow::Context;

const ADDR_VAR: &str = "BINTRACK_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy)]
/// Settings for the HTTP server process.
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Read the configuration, falling back to `127.0.0.1:3000` when
    /// `BINTRACK_ADDR` is unset.
    ///
    /// # Errors
    ///
    /// Fails when `BINTRACK_ADDR` is set but not a valid socket address.
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = env::var(ADDR_VAR).unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
        let bind_addr = raw
            .parse()
            .with_context(|| format!("{ADDR_VAR} is not a valid socket address: {raw}"))?;
        Ok(Self { bind_addr })
    }
}
