use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

use crate::provider::DEFAULT_BASE_URL;

const DEFAULT_HOST: Ipv4Addr = Ipv4Addr::UNSPECIFIED;
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("HOST is not a valid IPv4 address: {0}")]
    InvalidHost(String),

    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: Ipv4Addr,
    pub port: u16,
    pub provider_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            provider_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads `HOST`, `PORT` and `STATS_PROVIDER_URL`, picking up a `.env`
    /// file first when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host.parse().map_err(|_| ConfigError::InvalidHost(host))?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(url) = lookup("STATS_PROVIDER_URL") {
            config.provider_base_url = url;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}
