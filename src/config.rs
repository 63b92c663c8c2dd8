use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::frame::{Limits, DEFAULT_MAX_BULK_LEN, DEFAULT_MAX_DEPTH};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Everything a client needs to reach and talk to a server.
///
/// Nothing is read from the environment: the defaults are `localhost:6379`, plain TCP, no
/// authentication and no timeouts.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// When set, connect to this Unix domain socket instead of `host:port`.
    pub unix_socket: Option<PathBuf>,
    pub use_tls: bool,
    /// ACL user (Redis 6.0+). Only used together with `password`.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Database selected right after connecting.
    pub database: i64,
    /// Name announced with `CLIENT SETNAME` right after connecting.
    pub client_name: Option<String>,
    /// Bounds transport setup plus handshake. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Bounds how long a caller waits for a reply. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub max_reconnect_attempts: u32,
    pub reconnect_backoff: Backoff,
    pub max_nesting_depth: usize,
    pub max_bulk_len: usize,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> ClientConfig {
        ClientConfig {
            host: host.into(),
            port,
            ..ClientConfig::default()
        }
    }

    pub fn unix(path: impl Into<PathBuf>) -> ClientConfig {
        ClientConfig {
            unix_socket: Some(path.into()),
            ..ClientConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unix_socket.is_none() {
            if self.host.is_empty() {
                return Err(ConfigError::EmptyHost);
            }
            if self.port == 0 {
                return Err(ConfigError::InvalidPort);
            }
        } else if self.use_tls {
            return Err(ConfigError::TlsOverUnixSocket);
        }

        if self.username.is_some() && self.password.is_none() {
            return Err(ConfigError::UsernameWithoutPassword);
        }
        if self.database < 0 {
            return Err(ConfigError::NegativeDatabase(self.database));
        }
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_nesting_depth"));
        }
        if self.max_bulk_len == 0 {
            return Err(ConfigError::ZeroLimit("max_bulk_len"));
        }

        Ok(())
    }

    pub fn address(&self) -> Address {
        match &self.unix_socket {
            Some(path) => Address::Unix(path.clone()),
            None => Address::Tcp {
                host: self.host.clone(),
                port: self.port,
            },
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_nesting_depth,
            max_bulk_len: self.max_bulk_len,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            unix_socket: None,
            use_tls: false,
            username: None,
            password: None,
            database: 0,
            client_name: None,
            connect_timeout: None,
            request_timeout: None,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_backoff: Backoff::default(),
            max_nesting_depth: DEFAULT_MAX_DEPTH,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Address::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// Exponential delay between reconnect attempts: `base * factor^attempt`, capped at `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub factor: u32,
    pub max: Duration,
}

impl Backoff {
    /// Delay before the zero-based `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(attempt);
        self.base.saturating_mul(multiplier).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            base: Duration::from_millis(100),
            factor: 2,
            max: Duration::from_secs(5),
        }
    }
}
