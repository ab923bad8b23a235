use flexi_logger::FlexiLoggerError;
use rusqlite::Error as RusqliteError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error), // Converts io::Error into MigrateError automatically

    #[error("Database error: {0}")]
    DatabaseError(#[from] RusqliteError), // Converts rusqlite::Error automatically

    #[error("Logger error: {0}")]
    LoggerError(#[from] FlexiLoggerError),

    #[error("{0}")]
    Usage(String),

    #[error("Guild '{guild_id}' is missing required key '{key}'")]
    MissingKey { guild_id: String, key: String },

    #[error("Malformed TSV record {record}: expected 3 fields, found {fields}")]
    MalformedRow { record: usize, fields: usize },

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}
