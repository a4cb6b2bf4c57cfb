//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use kpa_backend::outbound::persistence::DbPool;
use kpa_backend::outbound::security::JwtSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) jwt: JwtSettings,
}

impl ServerConfig {
    /// Construct a server configuration over an established pool.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, jwt: JwtSettings) -> Self {
        Self {
            bind_addr,
            db_pool,
            jwt,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
