/// Miniquery Error Module
///
/// This module defines the error types for the whole pipeline, from argument
/// validation through driver loading, statement execution and rendering.
use std::fmt;
use thiserror::Error;

/// Boxed driver-level error used as the source of connection and execution faults.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a required parameter was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamFault {
    /// The flag itself was not supplied.
    NotFound,
    /// The flag was the last argument, with nothing after it.
    NoValue,
    /// The value was empty or whitespace only.
    Empty,
}

/// A rejected parameter together with the flag it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingParameter {
    pub name: &'static str,
    pub fault: ParamFault,
}

impl fmt::Display for MissingParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fault {
            ParamFault::NotFound => write!(f, "--{} not found!", self.name),
            ParamFault::NoValue => write!(f, "--{} requires a value!", self.name),
            ParamFault::Empty => write!(f, "{} is invalid or empty!", self.name),
        }
    }
}

/// Error type for the miniquery tool.
///
/// The first four variants are detected before any database interaction and
/// end the process with a usage message.
#[derive(Error, Debug)]
pub enum MiniQueryError {
    /// A required flag was absent, had no value, or had a blank value
    #[error("{0}")]
    MissingOrEmptyParameter(MissingParameter),

    /// `--db` named a database kind outside mysql/oracle/db2
    #[error("unsupported db:{0}")]
    UnsupportedDatabase(String),

    /// `--operation` named something outside select/insert/update/delete
    #[error("unsupported operation:{0}")]
    UnsupportedOperation(String),

    /// No registered driver answers to the requested identifier
    #[error("database {db} driver:{driver} load failed!")]
    DriverLoadFailure { db: String, driver: String },

    /// The driver could not open a connection
    #[error("connection to {url} failed: {source}")]
    ConnectionFailure {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Statement execution or row reading failed
    #[error("execution failed: {message}")]
    ExecutionFault {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The cursor cannot be copied into a detached snapshot
    #[error("detached snapshot is not supported by this cursor")]
    DetachUnsupported,

    /// A row did not have one value per column
    #[error("row has {actual} values but the listing has {expected} columns")]
    RowArity { expected: usize, actual: usize },

    /// Settings file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MiniQueryError {
    /// Shorthand for a missing or blank parameter.
    pub fn missing(name: &'static str, fault: ParamFault) -> Self {
        MiniQueryError::MissingOrEmptyParameter(MissingParameter { name, fault })
    }

    /// Wraps a driver error raised while executing a statement or reading rows.
    pub fn execution<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        MiniQueryError::ExecutionFault {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wraps a driver error raised while connecting.
    pub fn connection<E>(url: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        MiniQueryError::ConnectionFailure {
            url: url.into(),
            source: source.into(),
        }
    }

    /// True for failures that should be followed by the usage text.
    pub fn wants_usage(&self) -> bool {
        matches!(
            self,
            MiniQueryError::MissingOrEmptyParameter(_)
                | MiniQueryError::UnsupportedDatabase(_)
                | MiniQueryError::UnsupportedOperation(_)
                | MiniQueryError::DriverLoadFailure { .. }
                | MiniQueryError::Config(_)
        )
    }
}

/// Type alias for Result with `MiniQueryError` as the error type.
pub type Result<T> = std::result::Result<T, MiniQueryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = MiniQueryError::missing("db", ParamFault::NotFound);
        assert_eq!(err.to_string(), "--db not found!");

        let err = MiniQueryError::missing("driver", ParamFault::Empty);
        assert_eq!(err.to_string(), "driver is invalid or empty!");

        let err = MiniQueryError::UnsupportedOperation("foo".to_string());
        assert_eq!(err.to_string(), "unsupported operation:foo");

        let err = MiniQueryError::DriverLoadFailure {
            db: "mysql".to_string(),
            driver: "com.mysql.jdbc.Driver".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "database mysql driver:com.mysql.jdbc.Driver load failed!"
        );
    }

    #[test]
    fn test_execution_fault_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = MiniQueryError::execution("query failed", io_err);
        assert!(err.to_string().contains("query failed"));
        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
    }

    #[test]
    fn test_usage_classification() {
        assert!(MiniQueryError::UnsupportedDatabase("pg".into()).wants_usage());
        assert!(MiniQueryError::missing("sql", ParamFault::NoValue).wants_usage());
        assert!(!MiniQueryError::DetachUnsupported.wants_usage());
        assert!(!MiniQueryError::execution("x", "boom").wants_usage());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MiniQueryError = io_err.into();
        match err {
            MiniQueryError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }
    }
}
