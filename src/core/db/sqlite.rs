/// SQLite Driver Module
///
/// The bundled driver, backed by rusqlite. SQLite has no authentication, so the
/// user and password are accepted and ignored.

use crate::core::db::driver::{
    ColumnMeta, DbConnection, DetachedCursor, Driver, ResultCursor, ResultHandler, RowValues,
};
use crate::core::{MiniQueryError, Result};
use crate::table_listing::TableListing;
use rusqlite::{types::ValueRef, Connection, Rows, Statement};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Identifiers this driver answers to, compared case-insensitively.
const ALIASES: &[&str] = &["sqlite", "sqlite3", "rusqlite", "org.sqlite.JDBC"];

/// Column produced for plain inserts, named as JDBC drivers name generated keys.
pub const GENERATED_KEY: &str = "GENERATED_KEY";

/// Number of SQLite VM instructions between timeout checks.
const PROGRESS_STEPS: i32 = 1_000;

/// Driver for SQLite database files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn accepts(&self, id: &str) -> bool {
        ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(id))
    }

    fn connect(&self, url: &str, user: &str, _password: &str) -> Result<Box<dyn DbConnection>> {
        let path = database_path(url);
        debug!(path, user, "opening sqlite database");
        let conn = Connection::open(path).map_err(|e| MiniQueryError::connection(url, e))?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

/// Strips the URL schemes accepted for SQLite; anything else is a file path.
///
/// ```text
/// jdbc:sqlite:/data/app.db  -> /data/app.db
/// sqlite:///data/app.db     -> /data/app.db
/// sqlite::memory:           -> :memory:
/// ```
pub fn database_path(url: &str) -> &str {
    let url = url.trim();
    for prefix in ["jdbc:sqlite:", "sqlite://", "sqlite:"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            return rest;
        }
    }
    url
}

/// An open SQLite connection.
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    /// Wraps an already open connection.
    pub fn new(conn: Connection) -> Self {
        SqliteConnection { conn }
    }

    /// Aborts the running statement once `timeout` has elapsed.
    fn arm_timeout(&self, timeout: Option<Duration>) {
        if let Some(timeout) = timeout {
            let deadline = Instant::now() + timeout;
            self.conn
                .progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));
        }
    }

    fn disarm_timeout(&self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }

    fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        self.conn
            .prepare(sql)
            .map_err(|e| MiniQueryError::execution("failed to prepare statement", e))
    }

    fn stream(&self, sql: &str, handler: &mut dyn ResultHandler) -> Result<TableListing> {
        let mut stmt = self.prepare(sql)?;
        let columns = column_meta(&stmt);
        let rows = stmt
            .query([])
            .map_err(|e| MiniQueryError::execution("query execution failed", e))?;
        let mut cursor = SqliteCursor { columns, rows };
        handler.handle(&mut cursor)
    }

    fn insert_returning_keys(&self, sql: &str, handler: &mut dyn ResultHandler) -> Result<TableListing> {
        let mut stmt = self.prepare(sql)?;
        if stmt.column_count() > 0 {
            // INSERT ... RETURNING yields its own rows
            drop(stmt);
            return self.stream(sql, handler);
        }
        let inserted = stmt
            .execute([])
            .map_err(|e| MiniQueryError::execution("insert failed", e))?;
        let mut rows = Vec::new();
        if inserted > 0 {
            rows.push(vec![Some(self.conn.last_insert_rowid().to_string())]);
        }
        let mut keys = DetachedCursor::new(vec![ColumnMeta::new(None, GENERATED_KEY)], rows);
        handler.handle(&mut keys)
    }
}

impl DbConnection for SqliteConnection {
    fn query(
        &mut self,
        sql: &str,
        timeout: Option<Duration>,
        handler: &mut dyn ResultHandler,
    ) -> Result<TableListing> {
        self.arm_timeout(timeout);
        let result = self.stream(sql, handler);
        self.disarm_timeout();
        result
    }

    fn insert(
        &mut self,
        sql: &str,
        timeout: Option<Duration>,
        handler: &mut dyn ResultHandler,
    ) -> Result<TableListing> {
        self.arm_timeout(timeout);
        let result = self.insert_returning_keys(sql, handler);
        self.disarm_timeout();
        result
    }

    fn update(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64> {
        self.arm_timeout(timeout);
        let result = self
            .conn
            .execute(sql, [])
            .map(|changed| changed as u64)
            .map_err(|e| MiniQueryError::execution("update failed", e));
        self.disarm_timeout();
        result
    }

    fn close(self: Box<Self>) -> Result<()> {
        let SqliteConnection { conn } = *self;
        conn.close().map_err(|(_, e)| {
            warn!(error = %e, "sqlite connection did not close cleanly");
            MiniQueryError::execution("failed to close connection", e)
        })
    }
}

/// Column labels as reported by the prepared statement.
fn column_meta(stmt: &Statement<'_>) -> Vec<ColumnMeta> {
    stmt.column_names()
        .into_iter()
        .map(|name| ColumnMeta::new(Some(name.to_string()), name))
        .collect()
}

/// Forward-only cursor over a running SQLite statement.
struct SqliteCursor<'stmt> {
    columns: Vec<ColumnMeta>,
    rows: Rows<'stmt>,
}

impl ResultCursor for SqliteCursor<'_> {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<RowValues>> {
        let width = self.columns.len();
        let row = match self.rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(e) => return Err(MiniQueryError::execution("result processing failed", e)),
        };
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            let value = row
                .get_ref(i)
                .map_err(|e| MiniQueryError::execution("failed to read column value", e))?;
            values.push(format_value(value));
        }
        Ok(Some(values))
    }

    fn detach(&mut self) -> Result<DetachedCursor> {
        DetachedCursor::copy_from(self)
    }
}

/// Formats a SQLite value for display; NULL stays `None`.
fn format_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => Some(format!("<BLOB: {} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collect;

    impl ResultHandler for Collect {
        fn handle(&mut self, cursor: &mut dyn ResultCursor) -> Result<TableListing> {
            let mut builder = TableListing::builder();
            for column in cursor.columns() {
                builder = builder.add_field(column.display_name());
            }
            let mut listing = builder.build();
            while let Some(row) = cursor.next_row()? {
                listing.add_row(row)?;
            }
            Ok(listing)
        }
    }

    fn setup_test_table() -> SqliteConnection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE test (
                id INTEGER PRIMARY KEY,
                name TEXT,
                value REAL
            );
            INSERT INTO test (name, value) VALUES ('Alice', 123.45);
            INSERT INTO test (name, value) VALUES ('Bob', 678.90);
            INSERT INTO test (name, value) VALUES (NULL, NULL);
        ",
        )
        .unwrap();
        SqliteConnection::new(conn)
    }

    #[test]
    fn test_database_path() {
        assert_eq!(database_path("jdbc:sqlite:/tmp/a.db"), "/tmp/a.db");
        assert_eq!(database_path("sqlite:///tmp/a.db"), "/tmp/a.db");
        assert_eq!(database_path("sqlite::memory:"), ":memory:");
        assert_eq!(database_path(" data.db "), "data.db");
    }

    #[test]
    fn test_driver_aliases() {
        assert!(SqliteDriver.accepts("SQLite"));
        assert!(SqliteDriver.accepts("org.sqlite.JDBC"));
        assert!(!SqliteDriver.accepts("com.mysql.jdbc.Driver"));
    }

    #[test]
    fn test_query_execution() {
        let mut conn = setup_test_table();
        let listing = conn
            .query("SELECT id, name AS who, value FROM test ORDER BY id", None, &mut Collect)
            .unwrap();

        let titles: Vec<&str> = listing.columns().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["id", "who", "value"]);
        assert_eq!(listing.row_count(), 3);
        assert_eq!(
            listing.rows()[0],
            vec![Some("1".to_string()), Some("Alice".to_string()), Some("123.45".to_string())]
        );
        // NULL stays distinct from empty text
        assert_eq!(listing.rows()[2], vec![Some("3".to_string()), None, None]);
    }

    #[test]
    fn test_query_error_handling() {
        let mut conn = setup_test_table();
        let result = conn.query("SELECT * FROM nonexistent_table", None, &mut Collect);
        match result {
            Err(err @ MiniQueryError::ExecutionFault { .. }) => {
                let detail = format!("{:?}", err);
                assert!(detail.contains("no such table"), "{detail}");
            }
            other => panic!("Expected execution fault, got {:?}", other),
        }
    }

    #[test]
    fn test_update_reports_affected_rows() {
        let mut conn = setup_test_table();
        let changed = conn.update("DELETE FROM test WHERE name IS NULL", None).unwrap();
        assert_eq!(changed, 1);
        let changed = conn.update("UPDATE test SET value = 0", Some(Duration::from_secs(5))).unwrap();
        assert_eq!(changed, 2);
    }

    #[test]
    fn test_plain_insert_returns_generated_key() {
        let mut conn = setup_test_table();
        let listing = conn
            .insert("INSERT INTO test (name, value) VALUES ('Carol', 1.5)", None, &mut Collect)
            .unwrap();
        assert_eq!(listing.columns()[0].title, GENERATED_KEY);
        assert_eq!(listing.rows(), &[vec![Some("4".to_string())]]);
    }

    #[test]
    fn test_insert_returning_streams_rows() {
        let mut conn = setup_test_table();
        let listing = conn
            .insert(
                "INSERT INTO test (name, value) VALUES ('Dave', 2.0) RETURNING id, name",
                None,
                &mut Collect,
            )
            .unwrap();
        assert_eq!(listing.columns().len(), 2);
        assert_eq!(
            listing.rows(),
            &[vec![Some("4".to_string()), Some("Dave".to_string())]]
        );
    }

    #[test]
    fn test_blob_handling() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE blobs (id INTEGER, data BLOB)", []).unwrap();
        conn.execute("INSERT INTO blobs VALUES (1, X'48656C6C6F')", []).unwrap(); // "Hello" in hex
        let mut conn = SqliteConnection::new(conn);

        let listing = conn.query("SELECT data FROM blobs", None, &mut Collect).unwrap();
        assert_eq!(listing.rows()[0][0].as_deref(), Some("<BLOB: 5 bytes>"));
    }

    #[test]
    fn test_statement_timeout_aborts() {
        let mut conn = setup_test_table();
        let sql = "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) \
                   SELECT count(*) FROM c";
        let result = conn.query(sql, Some(Duration::from_millis(50)), &mut Collect);
        assert!(matches!(result, Err(MiniQueryError::ExecutionFault { .. })));

        // the handler is removed afterwards
        let listing = conn.query("SELECT 1", None, &mut Collect).unwrap();
        assert_eq!(listing.row_count(), 1);
    }

    #[test]
    fn test_detach_copies_remaining_rows() {
        let conn = setup_test_table();
        let mut stmt = conn.conn.prepare("SELECT name FROM test ORDER BY id").unwrap();
        let columns = column_meta(&stmt);
        let rows = stmt.query([]).unwrap();
        let mut cursor = SqliteCursor { columns, rows };

        let mut snapshot = cursor.detach().unwrap();
        assert_eq!(snapshot.remaining(), 3);
        assert_eq!(cursor.next_row().unwrap(), None);
        assert_eq!(snapshot.next_row().unwrap(), Some(vec![Some("Alice".to_string())]));
    }

    #[test]
    fn test_connect_and_close() {
        let conn = SqliteDriver.connect("sqlite::memory:", "ignored", "").unwrap();
        conn.close().unwrap();
    }
}
