/// Oracle Driver Module
///
/// Optional driver (cargo feature `oracle`) backed by the `oracle` crate, which
/// loads the Oracle client library at runtime. Its cursor cannot be detached,
/// so results are always read live.

use crate::core::db::driver::{
    ColumnMeta, DbConnection, DetachedCursor, Driver, ResultCursor, ResultHandler, RowValues,
};
use crate::core::{MiniQueryError, Result};
use crate::table_listing::TableListing;
use oracle::{Connection, ResultSet, Row};
use std::time::Duration;
use tracing::{debug, warn};

const ALIASES: &[&str] = &["oracle", "oracle.jdbc.driver.OracleDriver", "oracle.jdbc.OracleDriver"];

/// Driver for Oracle databases.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDriver;

impl Driver for OracleDriver {
    fn name(&self) -> &str {
        "oracle"
    }

    fn accepts(&self, id: &str) -> bool {
        ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(id))
    }

    fn connect(&self, url: &str, user: &str, password: &str) -> Result<Box<dyn DbConnection>> {
        let connect_string = connect_string(url);
        debug!(connect_string = %connect_string, user, "connecting to oracle");
        let mut conn = Connection::connect(user, password, &connect_string)
            .map_err(|e| MiniQueryError::connection(url, e))?;
        conn.set_autocommit(true);
        Ok(Box::new(OracleConnection { conn }))
    }
}

/// Turns a JDBC thin URL into an Easy Connect string; other input is passed through.
///
/// ```text
/// jdbc:oracle:thin:@127.0.0.1:1521:ORCL      -> 127.0.0.1:1521/ORCL
/// jdbc:oracle:thin:@//127.0.0.1:1521/service -> //127.0.0.1:1521/service
/// ```
pub fn connect_string(url: &str) -> String {
    let url = url.trim();
    let Some(target) = url.strip_prefix("jdbc:oracle:thin:@") else {
        return url.to_string();
    };
    if target.starts_with("//") {
        return target.to_string();
    }
    // host:port:sid
    match target.rsplit_once(':') {
        Some((host_port, sid)) if host_port.contains(':') => format!("{}/{}", host_port, sid),
        _ => target.to_string(),
    }
}

/// An open Oracle connection in autocommit mode.
pub struct OracleConnection {
    conn: Connection,
}

impl OracleConnection {
    fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.conn
            .set_call_timeout(timeout)
            .map_err(|e| MiniQueryError::execution("failed to set call timeout", e))
    }

    fn stream(&self, sql: &str, handler: &mut dyn ResultHandler) -> Result<TableListing> {
        let mut stmt = self
            .conn
            .statement(sql)
            .build()
            .map_err(|e| MiniQueryError::execution("failed to prepare statement", e))?;
        let rows = stmt
            .query(&[])
            .map_err(|e| MiniQueryError::execution("query execution failed", e))?;
        let columns = rows
            .column_info()
            .iter()
            .map(|col| ColumnMeta::new(None, col.name()))
            .collect();
        let mut cursor = OracleCursor { columns, rows };
        handler.handle(&mut cursor)
    }
}

impl DbConnection for OracleConnection {
    fn query(
        &mut self,
        sql: &str,
        timeout: Option<Duration>,
        handler: &mut dyn ResultHandler,
    ) -> Result<TableListing> {
        self.set_timeout(timeout)?;
        self.stream(sql, handler)
    }

    fn insert(
        &mut self,
        sql: &str,
        timeout: Option<Duration>,
        handler: &mut dyn ResultHandler,
    ) -> Result<TableListing> {
        self.set_timeout(timeout)?;
        let mut stmt = self
            .conn
            .statement(sql)
            .build()
            .map_err(|e| MiniQueryError::execution("failed to prepare statement", e))?;
        if stmt.is_query() {
            drop(stmt);
            return self.stream(sql, handler);
        }
        stmt.execute(&[])
            .map_err(|e| MiniQueryError::execution("insert failed", e))?;
        // generated keys need RETURNING ... INTO binds, which a plain statement cannot supply
        let mut keys = DetachedCursor::new(vec![ColumnMeta::new(None, "GENERATED_KEY")], Vec::new());
        handler.handle(&mut keys)
    }

    fn update(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64> {
        self.set_timeout(timeout)?;
        let mut stmt = self
            .conn
            .statement(sql)
            .build()
            .map_err(|e| MiniQueryError::execution("failed to prepare statement", e))?;
        stmt.execute(&[])
            .map_err(|e| MiniQueryError::execution("update failed", e))?;
        stmt.row_count()
            .map_err(|e| MiniQueryError::execution("failed to read affected rows", e))
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().map_err(|e| {
            warn!(error = %e, "oracle connection did not close cleanly");
            MiniQueryError::execution("failed to close connection", e)
        })
    }
}

/// Live cursor over an Oracle result set.
struct OracleCursor<'a> {
    columns: Vec<ColumnMeta>,
    rows: ResultSet<'a, Row>,
}

impl ResultCursor for OracleCursor<'_> {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<RowValues>> {
        let row = match self.rows.next() {
            Some(Ok(row)) => row,
            Some(Err(e)) => return Err(MiniQueryError::execution("result processing failed", e)),
            None => return Ok(None),
        };
        let mut values = Vec::with_capacity(self.columns.len());
        for i in 0..self.columns.len() {
            let value: Option<String> = row
                .get(i)
                .map_err(|e| MiniQueryError::execution("failed to read column value", e))?;
            values.push(value);
        }
        Ok(Some(values))
    }
}
