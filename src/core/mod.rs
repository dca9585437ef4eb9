/// Core Module for miniquery
///
/// Shared infrastructure: the error type and the database layer
/// (driver capability, execution dispatch and result materialization).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{MiniQueryError, Result};
