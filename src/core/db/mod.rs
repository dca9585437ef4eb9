/// Database Module
///
/// This module provides the database side of the query pipeline,
/// organized into focused submodules.
///
/// ## Architecture
///
/// - **Driver capability** (`driver.rs`): the `Driver` / `DbConnection` / `ResultCursor`
///   traits and the registry that resolves a driver identifier to an adapter
/// - **Adapters** (`sqlite.rs`, `oracle.rs`): concrete drivers
/// - **Query Execution** (`query.rs`): routes an operation to the row-returning or
///   mutation path and times it
/// - **Materialization** (`materialize.rs`): turns a cursor into a `TableListing`
///
/// ## Error Handling
///
/// All database operations use `MiniQueryError`. Driver errors surface as
/// `ConnectionFailure` or `ExecutionFault` with the driver error as source.
pub mod driver;
pub mod materialize;
#[cfg(feature = "oracle")]
pub mod oracle;
pub mod query;
pub mod sqlite;

pub use driver::*;
pub use materialize::*;
pub use query::*;
