//! Test infrastructure shared by the integration tests: a scripted driver
//! whose connections replay a fixed outcome and record every call.

#![allow(dead_code)]

use miniquery::core::db::{
    ColumnMeta, DbConnection, DetachedCursor, Driver, ResultCursor, ResultHandler, RowValues,
};
use miniquery::core::{MiniQueryError, Result};
use miniquery::table_listing::TableListing;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// What a scripted connection does when a statement runs.
#[derive(Debug, Clone)]
pub enum Script {
    /// Serve these rows through a live-only cursor
    Rows {
        columns: Vec<String>,
        rows: Vec<RowValues>,
    },
    /// Report this many affected rows
    Affected(u64),
    /// Fail execution with this driver message
    Fault(String),
    /// Refuse to connect
    RefuseConnection,
}

/// Shared call log.
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub struct ScriptedDriver {
    pub script: Script,
    pub log: CallLog,
}

impl ScriptedDriver {
    pub fn new(script: Script) -> (Self, CallLog) {
        let log = CallLog::default();
        (
            ScriptedDriver {
                script,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl Driver for ScriptedDriver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn accepts(&self, id: &str) -> bool {
        id == "scripted"
    }

    fn connect(&self, url: &str, user: &str, _password: &str) -> Result<Box<dyn DbConnection>> {
        self.log.borrow_mut().push(format!("connect {} {}", url, user));
        if let Script::RefuseConnection = self.script {
            return Err(MiniQueryError::connection(url, "connection refused"));
        }
        Ok(Box::new(ScriptedConnection {
            script: self.script.clone(),
            log: Rc::clone(&self.log),
        }))
    }
}

struct ScriptedConnection {
    script: Script,
    log: CallLog,
}

impl ScriptedConnection {
    fn rows(&self, handler: &mut dyn ResultHandler) -> Result<TableListing> {
        match &self.script {
            Script::Rows { columns, rows } => {
                let mut cursor = LiveCursor {
                    columns: columns.iter().map(|c| ColumnMeta::new(Some(c.clone()), c.as_str())).collect(),
                    rows: rows.clone().into_iter(),
                };
                handler.handle(&mut cursor)
            }
            Script::Fault(message) => Err(MiniQueryError::execution("query failed", message.clone())),
            _ => {
                let mut empty = DetachedCursor::default();
                handler.handle(&mut empty)
            }
        }
    }
}

impl DbConnection for ScriptedConnection {
    fn query(&mut self, sql: &str, timeout: Option<Duration>, handler: &mut dyn ResultHandler) -> Result<TableListing> {
        self.log.borrow_mut().push(format!("query {} {:?}", sql, timeout));
        self.rows(handler)
    }

    fn insert(&mut self, sql: &str, timeout: Option<Duration>, handler: &mut dyn ResultHandler) -> Result<TableListing> {
        self.log.borrow_mut().push(format!("insert {} {:?}", sql, timeout));
        self.rows(handler)
    }

    fn update(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64> {
        self.log.borrow_mut().push(format!("update {} {:?}", sql, timeout));
        match &self.script {
            Script::Affected(count) => Ok(*count),
            Script::Fault(message) => Err(MiniQueryError::execution("update failed", message.clone())),
            _ => Ok(0),
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.log.borrow_mut().push("close".to_string());
        Ok(())
    }
}

/// Cursor without detach support, so the live read path is used.
struct LiveCursor {
    columns: Vec<ColumnMeta>,
    rows: std::vec::IntoIter<RowValues>,
}

impl ResultCursor for LiveCursor {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<RowValues>> {
        Ok(self.rows.next())
    }
}

/// Builds an argument vector from flag/value pairs.
pub fn argv(pairs: &[(&str, &str)]) -> Vec<String> {
    pairs
        .iter()
        .flat_map(|(flag, value)| [format!("--{}", flag), value.to_string()])
        .collect()
}

pub fn text_row(values: &[&str]) -> RowValues {
    values.iter().map(|v| Some(v.to_string())).collect()
}
