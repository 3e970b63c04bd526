//! Pooled MySQL data access with three generic operations: fetch the last
//! value of a column, insert a record, update a record by id. Results are
//! delivered through callbacks ([`DataAccessFacade`]) or futures ([`DataAccess`]).

pub mod error;
pub mod executor;
pub mod models;
pub mod schema;
pub mod transaction;
pub mod udbc;
#[cfg(feature = "mysql")]
pub mod udbc_mysql;

pub use error::{DbError, ErrorKind};
pub use executor::{DataAccess, DataAccessFacade};
pub use models::db_config::{AppConfig, MysqlConfig};
pub use schema::Schema;
pub use udbc::{Record, Value};
