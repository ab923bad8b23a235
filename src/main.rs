mod cli;
mod config;
mod database;
mod dump;
mod error;
mod flatten;
mod reflatten;
mod schema;
mod tsv;

use std::io;

use cli::Cli;
use flexi_logger::{Logger, LoggerHandle};
use log::{debug, error};

use crate::config::Config;
use crate::error::MigrateError;

fn start_logger(level: &str) -> Result<LoggerHandle, MigrateError> {
    // RUST_LOG, when set, takes precedence over the configured level.
    // Output goes to stderr so that `dump` keeps stdout to itself.
    let handle = Logger::try_with_env_or_str(level)?
        .format(flexi_logger::detailed_format)
        .start()?;
    Ok(handle)
}

fn main() {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(err) => std::process::exit(cli::report_error(&err, &mut io::stdout(), &mut io::stderr())),
    };
    let config = Config::install(Config::load_config(cli.config.as_deref()));

    let _logger = match start_logger(&config.logging.level) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to start logging: {}", err);
            None
        }
    };

    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());
    debug!("Configuration: {:?}", config);

    if let Err(err) = cli.handle_command_line() {
        if !matches!(err, MigrateError::Usage(_)) {
            error!("{:?}", err);
        }
        std::process::exit(cli::report_error(&err, &mut io::stdout(), &mut io::stderr()));
    }
}
