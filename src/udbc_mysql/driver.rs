use crate::error::DbError;
use crate::models::db_config::MysqlConfig;
use crate::udbc::PoolOptions;
use crate::udbc::connection::Connection;
use crate::udbc::driver::Driver;
use crate::udbc_mysql::connection::MysqlConnection;
use async_trait::async_trait;
use mysql_async::Pool as MySqlPoolInternal;
use mysql_async::{OptsBuilder, PoolConstraints, PoolOpts};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// `mysql_async` pool behind the [`Driver`] trait.
///
/// The pool opens connections lazily, up to `max_open_conns`; callers past
/// that limit wait for a connection to be returned. They wait indefinitely
/// unless `timeout` is set, in which case they fail with `PoolExhausted`.
pub struct MysqlDriver {
    name: String,
    options: PoolOptions,
    pool: MySqlPoolInternal,
}

impl MysqlDriver {
    pub fn from_config(config: &MysqlConfig) -> Result<Self, DbError> {
        config.validate()?;
        let builder = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()));
        let driver = Self::build(config.pool_name.clone(), builder, config.pool_options())?;
        info!(
            pool = %driver.name,
            host = %config.host,
            port = config.port,
            database = %config.database,
            pool_size = config.pool_size,
            "mysql pool created"
        );
        Ok(driver)
    }

    fn build(name: String, builder: OptsBuilder, options: PoolOptions) -> Result<Self, DbError> {
        let constraints = PoolConstraints::new(
            options.min_idle_conns as usize,
            options.max_open_conns as usize,
        )
        .ok_or_else(|| DbError::Configuration("Invalid pool constraints: min > max".to_string()))?;

        let mut pool_opts = PoolOpts::default().with_constraints(constraints);
        if options.max_lifetime > 0 {
            pool_opts =
                pool_opts.with_inactive_connection_ttl(Duration::from_secs(options.max_lifetime));
        }

        let pool = MySqlPoolInternal::new(builder.pool_opts(pool_opts));
        Ok(Self {
            name,
            options,
            pool,
        })
    }
}

#[async_trait]
impl Driver for MysqlDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn placeholder(&self, _param_seq: usize, _param_name: &str) -> String {
        "?".to_string()
    }

    async fn connection(&self) -> Result<Arc<dyn Connection>, DbError> {
        let conn = acquire(&self.name, self.options.timeout, self.pool.get_conn()).await?;
        Ok(Arc::new(MysqlConnection::new(conn)))
    }

    async fn close(&self) -> Result<(), DbError> {
        self.pool.clone().disconnect().await?;
        info!(pool = %self.name, "mysql pool disconnected");
        Ok(())
    }
}

async fn acquire<F, T>(pool: &str, timeout_secs: u64, get_conn: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, mysql_async::Error>>,
{
    if timeout_secs == 0 {
        return Ok(get_conn.await?);
    }
    match tokio::time::timeout(Duration::from_secs(timeout_secs), get_conn).await {
        Ok(conn) => Ok(conn?),
        Err(_) => Err(DbError::PoolExhausted(format!(
            "no connection from pool {} within {}s",
            pool, timeout_secs
        ))),
    }
}
