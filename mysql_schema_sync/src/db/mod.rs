//! Database access: connection pools and transactional batch execution

pub mod connection;
pub mod executor;

pub use connection::connect;
pub use executor::BatchExecutor;
