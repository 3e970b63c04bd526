use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::DbError;
use crate::udbc::{DEFAULT_POOL_NAME, DEFAULT_POOL_SIZE, PoolOptions};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Whole configuration file: the `[mysql]` section plus an optional `[schema]` allow-list.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mysql: MysqlConfig,
    /// table -> permitted columns
    #[serde(default)]
    pub schema: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Clone, Deserialize)]
pub struct MysqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_pool_name")]
    pub pool_name: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default)]
    pub min_idle: usize,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_pool_name() -> String {
    DEFAULT_POOL_NAME.to_string()
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_acquire_timeout() -> u64 {
    PoolOptions::default().timeout
}

fn default_max_lifetime() -> u64 {
    PoolOptions::default().max_lifetime
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

// Hand-written so the password never ends up in logs.
impl std::fmt::Debug for MysqlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("pool_name", &self.pool_name)
            .field("pool_size", &self.pool_size)
            .field("min_idle", &self.min_idle)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}

impl AppConfig {
    /// Load config from a TOML file.
    ///
    /// A missing file is reported with the path that was expected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DbError::Configuration(format!(
                "config file not found at {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            DbError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| DbError::Configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, DbError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DbError::Configuration(format!("invalid TOML: {}", e)))?;
        config.mysql.validate()?;
        Ok(config)
    }
}

impl MysqlConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            pool_name: default_pool_name(),
            pool_size: default_pool_size(),
            min_idle: 0,
            acquire_timeout_secs: default_acquire_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            max_in_flight: default_max_in_flight(),
        }
    }

    pub fn pool_name(mut self, pool_name: impl Into<String>) -> Self {
        self.pool_name = pool_name.into();
        self
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn acquire_timeout_secs(mut self, secs: u64) -> Self {
        self.acquire_timeout_secs = secs;
        self
    }

    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn validate(&self) -> Result<(), DbError> {
        if self.pool_size == 0 {
            return Err(DbError::Configuration("pool_size must be at least 1".into()));
        }
        if self.min_idle > self.pool_size {
            return Err(DbError::Configuration(format!(
                "min_idle ({}) exceeds pool_size ({})",
                self.min_idle, self.pool_size
            )));
        }
        if self.max_in_flight == 0 {
            return Err(DbError::Configuration("max_in_flight must be at least 1".into()));
        }
        Ok(())
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_open_conns: self.pool_size as u64,
            min_idle_conns: self.min_idle as u64,
            max_lifetime: self.max_lifetime_secs,
            timeout: self.acquire_timeout_secs,
        }
    }
}
