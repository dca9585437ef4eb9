use miniquery::{app, core::db::DriverRegistry, logging};
use std::io;
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    logging::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let registry = DriverRegistry::with_defaults();
    info!(drivers = ?registry.names(), "starting miniquery");

    let stdout = io::stdout();
    let stderr = io::stderr();
    let code = app::run(&args, &registry, &mut stdout.lock(), &mut stderr.lock());
    ExitCode::from(code)
}
