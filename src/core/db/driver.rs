/// Driver Capability Module
///
/// The pipeline never talks to a concrete database directly. A driver is
/// looked up by identifier in a `DriverRegistry`, opens a `DbConnection`, and
/// the connection hands its forward-only `ResultCursor` to a `ResultHandler`.
use crate::core::{MiniQueryError, Result};
use crate::table_listing::TableListing;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// A single result row: one optional text value per column, `None` for SQL NULL.
pub type RowValues = Vec<Option<String>>;

/// Column metadata exposed by a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Display label (the `AS` alias), if the driver reports one
    pub label: Option<String>,
    /// Raw column name
    pub name: String,
}

impl ColumnMeta {
    pub fn new(label: Option<String>, name: impl Into<String>) -> Self {
        ColumnMeta {
            label,
            name: name.into(),
        }
    }

    /// The label, or the raw column name when the label is absent or empty.
    pub fn display_name(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.name,
        }
    }
}

/// A forward-only result cursor.
pub trait ResultCursor {
    /// Column metadata, in result-set order.
    fn columns(&self) -> &[ColumnMeta];

    /// Reads the next row, or `None` once the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<RowValues>>;

    /// Copies the remaining rows into a snapshot that does not borrow the
    /// connection. Cursors that cannot do this return `DetachUnsupported`
    /// without consuming any row.
    fn detach(&mut self) -> Result<DetachedCursor> {
        Err(MiniQueryError::DetachUnsupported)
    }
}

/// A memory-resident copy of a cursor.
#[derive(Debug, Clone, Default)]
pub struct DetachedCursor {
    columns: Vec<ColumnMeta>,
    rows: VecDeque<RowValues>,
}

impl DetachedCursor {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<RowValues>) -> Self {
        DetachedCursor {
            columns,
            rows: rows.into(),
        }
    }

    /// Drains `cursor` into memory.
    pub fn copy_from<C: ResultCursor + ?Sized>(cursor: &mut C) -> Result<Self> {
        let columns = cursor.columns().to_vec();
        let mut rows = VecDeque::new();
        while let Some(row) = cursor.next_row()? {
            rows.push_back(row);
        }
        debug!(rows = rows.len(), "copied cursor into detached snapshot");
        Ok(DetachedCursor { columns, rows })
    }

    /// Rows not yet read.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl ResultCursor for DetachedCursor {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<RowValues>> {
        Ok(self.rows.pop_front())
    }

    fn detach(&mut self) -> Result<DetachedCursor> {
        Ok(std::mem::take(self))
    }
}

/// Consumes a cursor produced by a row-returning statement.
pub trait ResultHandler {
    fn handle(&mut self, cursor: &mut dyn ResultCursor) -> Result<TableListing>;
}

/// A live database connection.
///
/// `timeout` bounds a single statement; `None` lets it run indefinitely.
pub trait DbConnection {
    /// Runs a query and passes its cursor to `handler`.
    fn query(
        &mut self,
        sql: &str,
        timeout: Option<Duration>,
        handler: &mut dyn ResultHandler,
    ) -> Result<TableListing>;

    /// Runs an insert and passes the cursor of generated data to `handler`.
    fn insert(
        &mut self,
        sql: &str,
        timeout: Option<Duration>,
        handler: &mut dyn ResultHandler,
    ) -> Result<TableListing>;

    /// Runs an update or delete and returns the affected-row count.
    fn update(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64>;

    /// Releases the connection.
    fn close(self: Box<Self>) -> Result<()>;
}

/// A pluggable database driver.
pub trait Driver {
    /// Canonical driver name, used in logs.
    fn name(&self) -> &str;

    /// Whether this driver answers to `id`.
    fn accepts(&self, id: &str) -> bool;

    /// Opens a connection.
    fn connect(&self, url: &str, user: &str, password: &str) -> Result<Box<dyn DbConnection>>;
}

/// Resolves driver identifiers to registered drivers.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        DriverRegistry::default()
    }

    /// A registry holding every driver compiled into this build.
    pub fn with_defaults() -> Self {
        let mut registry = DriverRegistry::new();
        registry.register(Box::new(crate::core::db::sqlite::SqliteDriver));
        #[cfg(feature = "oracle")]
        registry.register(Box::new(crate::core::db::oracle::OracleDriver));
        registry
    }

    pub fn register(&mut self, driver: Box<dyn Driver>) {
        debug!(driver = driver.name(), "registered driver");
        self.drivers.push(driver);
    }

    /// Finds the first driver that accepts `id`.
    pub fn load(&self, id: &str) -> Option<&dyn Driver> {
        let id = id.trim();
        self.drivers
            .iter()
            .find(|driver| driver.accepts(id))
            .map(|driver| &**driver)
    }

    /// Names of the registered drivers.
    pub fn names(&self) -> Vec<&str> {
        self.drivers.iter().map(|driver| driver.name()).collect()
    }
}
