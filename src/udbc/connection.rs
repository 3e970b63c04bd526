use crate::error::DbError;
use crate::udbc::value::{Record, Value};
use async_trait::async_trait;

/// A single pooled connection. Dropping the last handle returns it to its pool.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn query(&self, sql: &str, args: &[(String, Value)]) -> Result<Vec<Record>, DbError>;

    async fn execute(&self, sql: &str, args: &[(String, Value)]) -> Result<u64, DbError>;

    async fn last_insert_id(&self) -> Result<u64, DbError>;

    // ---------- transaction ----------
    async fn begin(&self) -> Result<(), DbError>;
    async fn commit(&self) -> Result<(), DbError>;
    async fn rollback(&self) -> Result<(), DbError>;
}
