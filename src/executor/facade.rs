use crate::error::DbError;
use crate::executor::access::DataAccess;
use crate::executor::dispatcher::Dispatcher;
use crate::models::db_config::DEFAULT_MAX_IN_FLIGHT;
use crate::schema::Schema;
use crate::udbc::connection::Connection;
use crate::udbc::driver::Driver;
use crate::udbc::value::{Record, Value};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

/// Callback-based data access.
///
/// Each operation returns as soon as it is scheduled. The database work runs
/// on the runtime the facade was built on, and the callback is invoked exactly
/// once, on a runtime worker thread, after the connection has gone back to the
/// pool. Callbacks of concurrent operations may fire in any order.
///
/// The exactly-once guarantee holds while that runtime is alive. Work handed
/// to a runtime that has already shut down is dropped by tokio without being
/// polled, so its callback never runs; call [`shutdown`](Self::shutdown)
/// before stopping the runtime.
pub struct DataAccessFacade {
    access: DataAccess,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for DataAccessFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAccessFacade").finish_non_exhaustive()
    }
}

impl DataAccessFacade {
    /// Builds a facade on the current tokio runtime.
    pub fn new(driver: Arc<dyn Driver>, schema: Schema) -> Result<Self, DbError> {
        Self::builder(driver, schema).build()
    }

    pub fn builder(driver: Arc<dyn Driver>, schema: Schema) -> FacadeBuilder {
        FacadeBuilder {
            driver,
            schema,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            handle: None,
        }
    }

    /// Builds the MySQL pool and allow-list described by `config`.
    #[cfg(feature = "mysql")]
    pub fn from_config(config: &crate::models::db_config::AppConfig) -> Result<Self, DbError> {
        use crate::udbc_mysql::driver::MysqlDriver;

        let schema = Schema::from_config(config.schema.as_ref())?;
        if !schema.is_strict() {
            tracing::warn!(
                pool = %config.mysql.pool_name,
                "no [schema] allow-list configured; only identifier syntax is checked"
            );
        }
        let driver = MysqlDriver::from_config(&config.mysql)?;
        Self::builder(Arc::new(driver), schema)
            .max_in_flight(config.mysql.max_in_flight)
            .build()
    }

    /// Future-based access for async callers.
    pub fn access(&self) -> &DataAccess {
        &self.access
    }

    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    /// Acquires one pooled connection, waiting while the pool is exhausted.
    pub async fn get_connection(&self) -> Result<Arc<dyn Connection>, DbError> {
        if self.dispatcher.is_closed() {
            return Err(DbError::Shutdown);
        }
        self.access.connection().await
    }

    /// Delivers the value of `column` in the most recent row (highest `id`), or
    /// `Value::Null` when the table is empty or the value is NULL.
    pub fn get_last_value<C>(&self, table: impl Into<String>, column: impl Into<String>, callback: C)
    where
        C: FnOnce(Result<Value, DbError>) + Send + 'static,
    {
        let table = table.into();
        let column = column.into();
        let access = self.access.clone();
        let target = table.clone();
        self.dispatcher.dispatch(
            "get_last_value",
            target,
            async move { access.last_value(&table, &column).await },
            callback,
        );
    }

    /// Inserts `record` and delivers the primary key the database assigned.
    pub fn save_record<C>(&self, table: impl Into<String>, record: Record, callback: C)
    where
        C: FnOnce(Result<u64, DbError>) + Send + 'static,
    {
        let table = table.into();
        let access = self.access.clone();
        let target = table.clone();
        self.dispatcher.dispatch(
            "save_record",
            target,
            async move { access.insert(&table, &record).await },
            callback,
        );
    }

    /// Updates the row `id = record_id` and delivers the affected row count.
    /// No matching row is reported as success with a count of 0.
    pub fn update_record<C>(&self, table: impl Into<String>, record_id: u64, record: Record, callback: C)
    where
        C: FnOnce(Result<u64, DbError>) + Send + 'static,
    {
        let table = table.into();
        let access = self.access.clone();
        let target = table.clone();
        self.dispatcher.dispatch(
            "update_record",
            target,
            async move { access.update(&table, record_id, &record).await },
            callback,
        );
    }

    /// Waits for scheduled operations, then closes the pool.
    ///
    /// Operations scheduled afterwards complete with [`DbError::Shutdown`].
    pub async fn shutdown(&self) -> Result<(), DbError> {
        self.dispatcher.drain().await;
        self.access.driver().close().await?;
        info!(pool = self.access.driver().name(), "data access facade shut down");
        Ok(())
    }
}

pub struct FacadeBuilder {
    driver: Arc<dyn Driver>,
    schema: Schema,
    max_in_flight: usize,
    handle: Option<Handle>,
}

impl FacadeBuilder {
    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Runtime to run operations on, for callers outside of it.
    pub fn handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn build(self) -> Result<DataAccessFacade, DbError> {
        let handle = match self.handle {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| {
                DbError::Configuration(format!("no tokio runtime to run operations on: {}", e))
            })?,
        };
        info!(
            pool = self.driver.name(),
            max_in_flight = self.max_in_flight,
            strict_schema = self.schema.is_strict(),
            "data access facade ready"
        );
        Ok(DataAccessFacade {
            access: DataAccess::new(self.driver, self.schema),
            dispatcher: Dispatcher::new(handle, self.max_in_flight),
        })
    }
}
