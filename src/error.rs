use thiserror::Error;

/// Coarse classification of a [`DbError`], stable enough to match on in callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    PoolExhausted,
    Connection,
    Query,
    Driver,
    Value,
    Identifier,
    Shutdown,
}

/// Represents errors that can occur while talking to the database.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Pool exhausted: {0}")]
    PoolExhausted(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Value error: {0}")]
    Value(String),
    #[error("Identifier not allowed: {0}")]
    Identifier(String),
    #[error("Data access facade is shut down")]
    Shutdown,
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Configuration(_) => ErrorKind::Configuration,
            DbError::PoolExhausted(_) => ErrorKind::PoolExhausted,
            DbError::Connection(_) => ErrorKind::Connection,
            DbError::Query(_) => ErrorKind::Query,
            DbError::Driver(_) => ErrorKind::Driver,
            DbError::Value(_) => ErrorKind::Value,
            DbError::Identifier(_) => ErrorKind::Identifier,
            DbError::Shutdown => ErrorKind::Shutdown,
        }
    }
}

impl serde::de::Error for DbError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        DbError::Value(msg.to_string())
    }
}

#[cfg(feature = "mysql")]
impl From<mysql_async::Error> for DbError {
    fn from(e: mysql_async::Error) -> Self {
        use mysql_async::{DriverError, Error};
        match e {
            Error::Server(err) => DbError::Query(format!("{} ({})", err.message, err.code)),
            Error::Io(err) => DbError::Connection(err.to_string()),
            Error::Url(err) => DbError::Configuration(err.to_string()),
            Error::Driver(DriverError::PoolDisconnected) => {
                DbError::Connection("pool was disconnected".into())
            }
            other => DbError::Driver(Box::new(other)),
        }
    }
}
