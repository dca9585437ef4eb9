/// Application Module
///
/// One invocation of the tool: validate arguments, load the driver, connect,
/// dispatch the statement, print the result and timings, close the connection.

use crate::args::{self, Configuration};
use crate::config::{self, Settings};
use crate::core::db::{DbConnection, DriverRegistry, QueryOutcome, QueryRunner, ResultMaterializer};
use crate::core::{MiniQueryError, Result};
use std::error::Error as _;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info};

/// Visual separator printed between output sections.
pub const SPLIT_LINE: &str =
    "- - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -";

/// Exit status for a completed run, including a reported execution fault.
pub const EXIT_OK: u8 = 0;
/// Exit status for invalid arguments, driver-load and connection failures.
pub const EXIT_FAILURE: u8 = 1;

/// Sample driver identifiers and connection URLs per database kind.
pub fn driver_and_url_samples() -> String {
    let samples = [
        ("mysql", "com.mysql.jdbc.Driver", "jdbc:mysql://127.0.0.1:3306/db_name?useUnicode=true&characterEncoding=utf8&useSSL=false"),
        ("oracle", "oracle.jdbc.driver.OracleDriver", "jdbc:oracle:thin:@127.0.0.1:1521:db_name"),
        ("db2", "com.ibm.db2.jcc.DB2Driver", "jdbc:db2://127.0.0.1:50000/db_name"),
        ("sqlite", "org.sqlite.JDBC", "jdbc:sqlite:/path/to/db_name.db"),
    ];

    let mut text = String::new();
    for (db, driver, _) in &samples {
        text.push_str(&format!("    {} sample driver:{}\n", db, driver));
    }
    for (db, _, url) in &samples {
        text.push_str(&format!("    {} sample url:{}\n", db, url));
    }
    text
}

/// Usage text printed with every argument error and for `--help`.
pub fn usage() -> String {
    format!(
        "usage: \n \
         miniquery \n    \
         --db mysql|oracle|db2\n    \
         --driver driver \n    \
         --url url \n    \
         --user user\n    \
         --password password \n    \
         --operation select|insert|delete|update \n    \
         --sql sql\n    \
         [--config settings.toml]\n\
         \n\
         database sample driver and url:\n{}",
        driver_and_url_samples()
    )
}

/// Runs the tool with `raw_args` (program name excluded) and returns the exit status.
///
/// Status lines and results go to `out`; errors, fault reports and usage go to `err`.
pub fn run<O: Write, E: Write>(
    raw_args: &[String],
    registry: &DriverRegistry,
    out: &mut O,
    err: &mut E,
) -> u8 {
    if args::wants_help(raw_args) {
        return match writeln!(out, "{}", usage()) {
            Ok(()) => EXIT_OK,
            Err(_) => EXIT_FAILURE,
        };
    }

    match execute(raw_args, registry, out, err) {
        Ok(()) => EXIT_OK,
        Err(failure) => {
            debug!(error = %failure, "miniquery aborted");
            let _ = writeln!(err, "error: {}", failure);
            if failure.wants_usage() {
                let _ = writeln!(err, "{}", usage());
            }
            EXIT_FAILURE
        }
    }
}

fn execute<O: Write, E: Write>(
    raw_args: &[String],
    registry: &DriverRegistry,
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    writeln!(out, "{}", SPLIT_LINE)?;
    let configuration = args::parse_args(raw_args, out)?;
    writeln!(out, "{}", SPLIT_LINE)?;
    let settings = config::load_settings(configuration.config_path.as_deref())?;
    debug!(?configuration, ?settings, "arguments accepted");

    let global_start = Instant::now();

    let driver = registry
        .load(&configuration.driver)
        .ok_or_else(|| MiniQueryError::DriverLoadFailure {
            db: configuration.db.to_string(),
            driver: configuration.driver.clone(),
        })?;
    info!(driver = driver.name(), "driver loaded");

    let connection = driver.connect(&configuration.url, &configuration.user, &configuration.password)?;
    writeln!(out, "{}", SPLIT_LINE)?;

    run_statement(connection, &configuration, &settings, out, err)?;

    writeln!(out, "{}", SPLIT_LINE)?;
    writeln!(out, "application total millis:{}", global_start.elapsed().as_millis())?;
    writeln!(out, "{}", SPLIT_LINE)?;
    Ok(())
}

/// Dispatches the statement and prints its outcome. An execution fault is
/// reported to `err` and does not fail the run. The connection is closed on
/// every path, and a failure to close is only logged.
fn run_statement<O: Write, E: Write>(
    mut connection: Box<dyn DbConnection>,
    configuration: &Configuration,
    settings: &Settings,
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    let runner = QueryRunner::new(settings.query.timeout());
    let mut materializer = ResultMaterializer::new(settings.render.clone(), settings.materialize.detach);

    let dispatched = runner.dispatch(
        connection.as_mut(),
        configuration.operation,
        &configuration.sql,
        &mut materializer,
    );

    if let Err(close_err) = connection.close() {
        debug!(error = %close_err, "ignoring error while closing connection");
    }

    match dispatched {
        Ok(executed) => {
            writeln!(out, "query runner millis:{}", executed.elapsed.as_millis())?;
            writeln!(out, "{}", SPLIT_LINE)?;
            match executed.outcome {
                QueryOutcome::Listing(listing) => writeln!(out, "{}", listing)?,
                QueryOutcome::Affected(count) => writeln!(
                    out,
                    "db operation:{}, affected rows:{}",
                    configuration.operation, count
                )?,
            }
        }
        Err(fault) => report_fault(err, &fault)?,
    }
    Ok(())
}

/// Writes the fault, its full cause chain and its debug form.
fn report_fault<E: Write>(err: &mut E, fault: &MiniQueryError) -> Result<()> {
    debug!(error = %fault, "statement execution failed");
    writeln!(err, "{}", fault)?;
    let mut cause = fault.source();
    while let Some(inner) = cause {
        writeln!(err, "caused by: {}", inner)?;
        cause = inner.source();
    }
    writeln!(err, "{:#?}", fault)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_lists_flags_and_samples() {
        let text = usage();
        for flag in ["--db", "--driver", "--url", "--user", "--password", "--operation", "--sql"] {
            assert!(text.contains(flag), "missing {flag}");
        }
        assert!(text.contains("mysql sample driver:com.mysql.jdbc.Driver"));
        assert!(text.contains("db2 sample url:jdbc:db2://127.0.0.1:50000/db_name"));
    }

    #[test]
    fn test_help_exits_zero() {
        let registry = DriverRegistry::new();
        let (mut out, mut err): (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());
        let code = run(&["--help".to_string()], &registry, &mut out, &mut err);
        assert_eq!(code, EXIT_OK);
        assert!(String::from_utf8(out).unwrap().starts_with("usage:"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_unknown_driver_fails_with_usage() {
        let registry = DriverRegistry::new();
        let args: Vec<String> = [
            "--db", "mysql", "--driver", "com.mysql.jdbc.Driver", "--url", "jdbc:mysql://h/db",
            "--user", "root", "--password", "", "--operation", "select", "--sql", "SELECT 1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let (mut out, mut err): (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());

        let code = run(&args, &registry, &mut out, &mut err);

        assert_eq!(code, EXIT_FAILURE);
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("error: database mysql driver:com.mysql.jdbc.Driver load failed!"));
        assert!(err.contains("usage:"));
    }
}
