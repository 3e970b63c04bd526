use crate::error::DbError;
use crate::udbc::connection::Connection;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Driver: Send + Sync {
    /// Pool name, used to label log events.
    fn name(&self) -> &str;

    fn placeholder(&self, param_seq: usize, param_name: &str) -> String;

    /// Quotes an already validated identifier.
    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    /// Acquires a connection, waiting while the pool is exhausted.
    async fn connection(&self) -> Result<Arc<dyn Connection>, DbError>;
    async fn close(&self) -> Result<(), DbError>;
}
