/// Query Execution Module
///
/// Routes a validated operation to the row-returning path (select, insert) or
/// the mutation path (update, delete) of a `DbConnection`, and measures how
/// long the call took.

use crate::args::Operation;
use crate::core::db::driver::{DbConnection, ResultHandler};
use crate::core::Result;
use crate::table_listing::TableListing;
use std::time::{Duration, Instant};
use tracing::debug;

/// What a statement produced.
#[derive(Debug)]
pub enum QueryOutcome {
    /// Rows from select or insert
    Listing(TableListing),
    /// Affected-row count from update or delete
    Affected(u64),
}

/// Result of one dispatched statement plus its wall-clock duration.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub outcome: QueryOutcome,
    pub elapsed: Duration,
}

/// Executes single statements with a fixed statement timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryRunner {
    timeout: Option<Duration>,
}

impl QueryRunner {
    /// `timeout = None` lets statements run until the driver returns.
    pub fn new(timeout: Option<Duration>) -> Self {
        QueryRunner { timeout }
    }

    /// Runs `sql` on `connection` the way `operation` asks for.
    ///
    /// Select and insert hand their cursor to `handler`; update and delete
    /// return the affected-row count. The statement text is not inspected:
    /// an insert is routed exactly like a select.
    ///
    /// # Errors
    ///
    /// Returns whatever the driver or the handler reports, normally
    /// `MiniQueryError::ExecutionFault`.
    pub fn dispatch(
        &self,
        connection: &mut dyn DbConnection,
        operation: Operation,
        sql: &str,
        handler: &mut dyn ResultHandler,
    ) -> Result<ExecutionOutcome> {
        debug!(%operation, row_path = operation.returns_rows(), "dispatching statement");
        let started = Instant::now();
        let outcome = match operation {
            Operation::Select => QueryOutcome::Listing(connection.query(sql, self.timeout, handler)?),
            Operation::Insert => QueryOutcome::Listing(connection.insert(sql, self.timeout, handler)?),
            Operation::Update | Operation::Delete => {
                QueryOutcome::Affected(connection.update(sql, self.timeout)?)
            }
        };
        let elapsed = started.elapsed();

        debug!(%operation, elapsed_ms = elapsed.as_millis() as u64, "statement finished");
        Ok(ExecutionOutcome { outcome, elapsed })
    }
}
