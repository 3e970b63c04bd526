pub mod value;

pub mod connection;
pub mod deserializer;
pub mod driver;
pub mod serializer;

pub use value::{Record, Value};

pub const DEFAULT_POOL_NAME: &str = "my_pool";
pub const DEFAULT_POOL_SIZE: usize = 10;

pub struct PoolOptions {
    pub max_open_conns: u64, // pool_size
    pub min_idle_conns: u64,
    pub max_lifetime: u64, // idle connection TTL in seconds, 0 keeps them forever
    pub timeout: u64,      // acquire timeout in seconds, 0 waits forever
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_open_conns: DEFAULT_POOL_SIZE as u64,
            min_idle_conns: 0,
            max_lifetime: 30 * 60,
            timeout: 0,
        }
    }
}
