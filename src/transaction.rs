use crate::error::DbError;
use crate::executor::statement::Statement;
use crate::udbc::connection::Connection;
use std::sync::Arc;
use tracing::warn;

/// One transaction on one pooled connection. Rolled back on drop unless finished.
pub struct Transaction {
    conn: Arc<dyn Connection>,
    finished: bool,
}

impl Transaction {
    pub async fn begin(conn: Arc<dyn Connection>) -> Result<Self, DbError> {
        conn.begin().await?;
        Ok(Self {
            conn,
            finished: false,
        })
    }

    pub async fn execute(&self, stmt: &Statement) -> Result<u64, DbError> {
        self.conn.execute(&stmt.sql, &stmt.params).await
    }

    pub async fn last_insert_id(&self) -> Result<u64, DbError> {
        self.conn.last_insert_id().await
    }

    pub async fn commit(mut self) -> Result<(), DbError> {
        // A failed COMMIT leaves the outcome to the server; don't issue a rollback after it.
        self.finished = true;
        self.conn.commit().await
    }

    pub async fn rollback(mut self) -> Result<(), DbError> {
        self.finished = true;
        self.conn.rollback().await
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let conn = self.conn.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = conn.rollback().await {
                        warn!(error = %e, "rollback of abandoned transaction failed");
                    }
                });
            }
            Err(_) => warn!("transaction dropped outside a runtime; left to the pool to reset"),
        }
    }
}
