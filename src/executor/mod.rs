pub mod access;
pub mod dispatcher;
pub mod facade;
pub mod statement;

pub use access::DataAccess;
pub use facade::{DataAccessFacade, FacadeBuilder};
