use crate::error::DbError;
use crate::executor::statement::{self, Statement};
use crate::schema::Schema;
use crate::transaction::Transaction;
use crate::udbc::connection::Connection;
use crate::udbc::deserializer::ValueDeserializer;
use crate::udbc::driver::Driver;
use crate::udbc::value::{Record, Value};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Future-based data access over a driver and an identifier allow-list.
///
/// Every method acquires its own connection and releases it before returning,
/// on success and on failure alike.
#[derive(Clone)]
pub struct DataAccess {
    driver: Arc<dyn Driver>,
    schema: Arc<Schema>,
}

impl DataAccess {
    pub fn new(driver: Arc<dyn Driver>, schema: Schema) -> Self {
        Self {
            driver,
            schema: Arc::new(schema),
        }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub async fn connection(&self) -> Result<Arc<dyn Connection>, DbError> {
        self.driver.connection().await
    }

    /// Value of `column` in the row with the highest `id`, or `Value::Null`
    /// when the table is empty or the value is NULL.
    pub async fn last_value(&self, table: &str, column: &str) -> Result<Value, DbError> {
        let stmt = statement::select_last(self.driver.as_ref(), &self.schema, table, column)?;
        let conn = self.connection().await?;
        let start = Instant::now();
        let result = conn.query(&stmt.sql, &stmt.params).await;
        drop(conn);
        let rows = result?;
        debug!(
            pool = self.driver.name(),
            sql = %stmt.sql,
            elapsed_ms = start.elapsed().as_millis() as u64,
            rows = rows.len(),
            "query"
        );
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .map(|(_, v)| v)
            .unwrap_or(Value::Null))
    }

    /// [`last_value`](Self::last_value) decoded into `T`; `None` for an empty table or NULL.
    pub async fn last_value_as<T>(&self, table: &str, column: &str) -> Result<Option<T>, DbError>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.last_value(table, column).await?;
        Option::<T>::deserialize(ValueDeserializer { value: &value })
    }

    /// Inserts `record` and returns the primary key the database assigned.
    pub async fn insert(&self, table: &str, record: &Record) -> Result<u64, DbError> {
        let stmt = statement::insert(self.driver.as_ref(), &self.schema, table, record)?;
        let conn = self.connection().await?;
        self.in_transaction(conn, &stmt, true).await
    }

    /// Updates the columns in `record` on the row `id = record_id` and returns
    /// the affected row count. A missing row is not an error.
    pub async fn update(&self, table: &str, record_id: u64, record: &Record) -> Result<u64, DbError> {
        let stmt = statement::update(self.driver.as_ref(), &self.schema, table, record_id, record)?;
        let conn = self.connection().await?;
        self.in_transaction(conn, &stmt, false).await
    }

    async fn in_transaction(
        &self,
        conn: Arc<dyn Connection>,
        stmt: &Statement,
        want_insert_id: bool,
    ) -> Result<u64, DbError> {
        let tx = Transaction::begin(conn).await?;
        let start = Instant::now();
        let outcome = match tx.execute(stmt).await {
            Ok(affected) if want_insert_id => tx.last_insert_id().await.map(|id| (affected, id)),
            Ok(affected) => Ok((affected, 0)),
            Err(e) => Err(e),
        };
        match outcome {
            Ok((affected, id)) => {
                tx.commit().await?;
                debug!(
                    pool = self.driver.name(),
                    sql = %stmt.sql,
                    params = ?stmt.params,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    affected,
                    "execute"
                );
                Ok(if want_insert_id { id } else { affected })
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(pool = self.driver.name(), error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }
}
