use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row as MyRow};
use tokio::sync::Mutex;

use crate::error::DbError;
use crate::udbc::connection::Connection;
use crate::udbc::value::{Record, Value};
use crate::udbc_mysql::value_codec::{from_mysql_value, to_mysql_value};

/// Pooled `mysql_async` connection; returns to the pool when dropped.
pub struct MysqlConnection {
    conn: Mutex<Conn>,
}

impl MysqlConnection {
    pub fn new(conn: Conn) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn map_row(row: MyRow) -> Record {
        let mut out = Record::new();
        let cols = row.columns_ref();
        for i in 0..row.len() {
            let Some(v) = row.as_ref(i) else {
                continue;
            };
            let (name, column_type) = match cols.get(i) {
                Some(c) => (c.name_str().to_string(), c.column_type()),
                None => (i.to_string(), mysql_async::consts::ColumnType::MYSQL_TYPE_NULL),
            };
            out.insert(name, from_mysql_value(v, column_type));
        }
        out
    }

    fn params(args: &[(String, Value)]) -> mysql_async::Params {
        if args.is_empty() {
            mysql_async::Params::Empty
        } else {
            mysql_async::Params::Positional(args.iter().map(|(_, v)| to_mysql_value(v)).collect())
        }
    }
}

#[async_trait]
impl Connection for MysqlConnection {
    async fn query(&self, sql: &str, args: &[(String, Value)]) -> Result<Vec<Record>, DbError> {
        let mut conn = self.conn.lock().await;
        let rows: Vec<MyRow> = conn.exec(sql, Self::params(args)).await?;
        Ok(rows.into_iter().map(Self::map_row).collect())
    }

    async fn execute(&self, sql: &str, args: &[(String, Value)]) -> Result<u64, DbError> {
        let mut conn = self.conn.lock().await;
        conn.exec_drop(sql, Self::params(args)).await?;
        Ok(conn.affected_rows())
    }

    async fn last_insert_id(&self) -> Result<u64, DbError> {
        let conn = self.conn.lock().await;
        // 0 when the table has no AUTO_INCREMENT column
        Ok(conn.last_insert_id().unwrap_or(0))
    }

    async fn begin(&self) -> Result<(), DbError> {
        self.conn.lock().await.query_drop("BEGIN").await?;
        Ok(())
    }

    async fn commit(&self) -> Result<(), DbError> {
        self.conn.lock().await.query_drop("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DbError> {
        self.conn.lock().await.query_drop("ROLLBACK").await?;
        Ok(())
    }
}
