/// Argument Validation Module
///
/// Scrapes the seven required flags out of the raw argument list, validates
/// each one, and echoes every accepted value (password masked) to the status
/// stream as it goes. The first invalid parameter stops validation.
use crate::core::error::ParamFault;
use crate::core::{MiniQueryError, Result};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// Printed in place of the password.
pub const PASSWORD_MASK: &str = "******";

/// Database kinds the tool knows sample drivers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Mysql,
    Oracle,
    Db2,
}

impl FromStr for DbKind {
    type Err = MiniQueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(DbKind::Mysql),
            "oracle" => Ok(DbKind::Oracle),
            "db2" => Ok(DbKind::Db2),
            _ => Err(MiniQueryError::UnsupportedDatabase(s.to_string())),
        }
    }
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DbKind::Mysql => "mysql",
            DbKind::Oracle => "oracle",
            DbKind::Db2 => "db2",
        })
    }
}

/// The statement kind requested with `--operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    /// Select and insert go through the row-returning path; the rest report a count.
    pub fn returns_rows(self) -> bool {
        matches!(self, Operation::Select | Operation::Insert)
    }
}

impl FromStr for Operation {
    type Err = MiniQueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(Operation::Select),
            "insert" => Ok(Operation::Insert),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Err(MiniQueryError::UnsupportedOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// Validated command line.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    pub db: DbKind,
    pub driver: String,
    pub url: String,
    pub user: String,
    pub password: String,
    pub operation: Operation,
    pub sql: String,
    /// Optional `--config` settings file
    pub config_path: Option<PathBuf>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("db", &self.db)
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &PASSWORD_MASK)
            .field("operation", &self.operation)
            .field("sql", &self.sql)
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Flags that take the following argument as their value.
const VALUE_FLAGS: &[&str] = &["db", "driver", "url", "user", "password", "operation", "sql", "config"];

/// True when the arguments ask for the usage text. A `-h` or `--help` that
/// is the value of another flag (a password, say) does not count.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().enumerate().any(|(i, arg)| {
        (arg == "--help" || arg == "-h") && !(i > 0 && takes_value(&args[i - 1]))
    })
}

fn takes_value(arg: &str) -> bool {
    arg.strip_prefix("--")
        .is_some_and(|flag| VALUE_FLAGS.iter().any(|name| name.eq_ignore_ascii_case(flag)))
}

/// Validates `args` (program name excluded) and echoes accepted values to `out`.
pub fn parse_args<W: Write>(args: &[String], out: &mut W) -> Result<Configuration> {
    let db_raw = required(args, "db")?;
    let db = db_raw.parse::<DbKind>()?;
    writeln!(out, "db type is:{}", db_raw)?;

    let driver = non_blank(args, "driver")?;
    writeln!(out, "db driver is:{}", driver)?;

    let url = non_blank(args, "url")?;
    writeln!(out, "db url is:{}", url)?;

    let user = non_blank(args, "user")?;
    writeln!(out, "db login user is:{}", user)?;

    // A blank password is a valid credential; only the flag is mandatory.
    let password = flag_value(args, "password")?;
    writeln!(out, "db login password is:{}", PASSWORD_MASK)?;

    let operation_raw = required(args, "operation")?;
    let operation = operation_raw.parse::<Operation>()?;
    writeln!(out, "db operation is:{}", operation_raw)?;

    let sql = non_blank(args, "sql")?;
    writeln!(out, "db sql is:{}", sql)?;

    let config_path = match find_flag(args, "config") {
        Some(_) => Some(PathBuf::from(flag_value(args, "config")?)),
        None => None,
    };

    Ok(Configuration {
        db,
        driver: driver.to_string(),
        url: url.to_string(),
        user: user.to_string(),
        password: password.to_string(),
        operation,
        sql: sql.to_string(),
        config_path,
    })
}

/// Index of the first argument equal to `--name`, ignoring case.
fn find_flag(args: &[String], name: &str) -> Option<usize> {
    args.iter().position(|arg| {
        arg.strip_prefix("--")
            .is_some_and(|flag| flag.eq_ignore_ascii_case(name))
    })
}

/// The argument following `--name`.
fn flag_value<'a>(args: &'a [String], name: &'static str) -> Result<&'a str> {
    let index = find_flag(args, name).ok_or(MiniQueryError::missing(name, ParamFault::NotFound))?;
    args.get(index + 1)
        .map(String::as_str)
        .ok_or(MiniQueryError::missing(name, ParamFault::NoValue))
}

/// Like `flag_value`, but an empty string counts as missing.
fn required<'a>(args: &'a [String], name: &'static str) -> Result<&'a str> {
    match flag_value(args, name)? {
        "" => Err(MiniQueryError::missing(name, ParamFault::Empty)),
        value => Ok(value),
    }
}

/// Like `flag_value`, but whitespace-only values count as missing.
fn non_blank<'a>(args: &'a [String], name: &'static str) -> Result<&'a str> {
    let value = flag_value(args, name)?;
    if value.trim().is_empty() {
        return Err(MiniQueryError::missing(name, ParamFault::Empty));
    }
    Ok(value)
}
