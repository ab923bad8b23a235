use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use log::{error, info};

use crate::config::Config;
use crate::database::Database;
use crate::dump::Dump;
use crate::error::MigrateError;
use crate::flatten::Flattener;
use crate::reflatten::Reflattener;
use crate::schema::{Revision, GUILD_SETTINGS};

#[derive(Parser)]
#[command(
    name = "jim-migrate",
    version,
    about = "Jim-Migrate: one-off migrations for Safety Jim guild settings"
)]
pub struct Cli {
    /// Configuration file (default: config.toml in the platform config directory)
    #[arg(long = "config", short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print every row of a table in a settings database
    Dump {
        /// Table to print
        #[arg(long = "table", short = 't', default_value = GUILD_SETTINGS)]
        table: String,

        /// Database file
        path: Option<PathBuf>,
    },

    /// Flatten GuildSettings, PrefixList and WelcomeMessages into the key-value Settings table (modifies the file in place)
    Flatten {
        /// Flattener revision (default: from config, normally v3)
        #[arg(long = "revision", short = 'r', value_enum)]
        revision: Option<Revision>,

        /// Database file
        path: Option<PathBuf>,
    },

    /// Rebuild one wide row per guild from a key-value TSV export
    Reflatten {
        /// Output file (default: from config, normally output.tsv)
        #[arg(long = "output", short = 'o')]
        output: Option<PathBuf>,

        /// Tab-separated export with a header line
        path: Option<PathBuf>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Dump { .. } => "dump",
            Command::Flatten { .. } => "flatten",
            Command::Reflatten { .. } => "reflatten",
        }
    }
}

pub const USAGE: &str = "USAGE: jim-migrate <command> <filename>";

impl Cli {
    pub fn parse_args() -> Result<Cli, MigrateError> {
        Self::parse_args_from(std::env::args_os())
    }

    /// Like `Cli::parse`, except that a missing subcommand is a usage error
    /// rather than clap's help on stderr. Everything else clap reports
    /// itself and exits.
    pub fn parse_args_from<I, T>(args: I) -> Result<Cli, MigrateError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(err) => match err.kind() {
                ErrorKind::MissingSubcommand
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    Err(MigrateError::Usage(USAGE.to_owned()))
                }
                _ => err.exit(),
            },
        }
    }

    pub fn handle_command_line(self) -> Result<(), MigrateError> {
        let config = Config::get();
        let command_name = self.command.name();

        match self.command {
            Command::Dump { table, path } => {
                let path = require_path(path, command_name)?;
                Self::dump(&path, &table)
            }
            Command::Flatten { revision, path } => {
                let path = require_path(path, command_name)?;
                Self::flatten(&path, revision.unwrap_or_else(|| config.flatten.revision()))
            }
            Command::Reflatten { output, path } => {
                let path = require_path(path, command_name)?;
                let output = output.unwrap_or_else(|| PathBuf::from(&config.reflatten.output));
                Self::reflatten(&path, &output)
            }
        }
    }

    fn dump(path: &Path, table: &str) -> Result<(), MigrateError> {
        let db = Database::open_read_only(path)?;
        let stdout = io::stdout();
        let count = Dump::dump_table(&db, table, &mut stdout.lock())?;
        info!("Dumped {} row(s) of {}", count, table);
        db.close()
    }

    fn flatten(path: &Path, revision: Revision) -> Result<(), MigrateError> {
        let mut db = Database::open(path)?;
        Flattener::flatten(&mut db, revision)?;
        db.close()
    }

    fn reflatten(path: &Path, output: &Path) -> Result<(), MigrateError> {
        Reflattener::reflatten(path, output)?;
        Ok(())
    }
}

/// Usage goes to `stdout`, everything else to `stderr`. Returns the exit
/// status.
pub fn report_error<O: Write, E: Write>(err: &MigrateError, stdout: &mut O, stderr: &mut E) -> i32 {
    let written = match err {
        MigrateError::Usage(usage) => writeln!(stdout, "{}", usage),
        other => writeln!(stderr, "{}", other),
    };
    if written.is_err() {
        error!("Failed to report error: {}", err);
    }
    1
}

fn require_path(path: Option<PathBuf>, command_name: &str) -> Result<PathBuf, MigrateError> {
    path.ok_or_else(|| {
        MigrateError::Usage(format!("USAGE: jim-migrate {} <filename>", command_name))
    })
}
