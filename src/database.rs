use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::MigrateError;

/// A table read wholesale into memory: column names in declaration order and
/// every row's values in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Opens an existing database file for reading and writing. Unlike a
    /// plain `Connection::open`, a missing file is an error rather than a
    /// freshly created empty database.
    pub fn open(path: &Path) -> Result<Self, MigrateError> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    pub fn open_read_only(path: &Path) -> Result<Self, MigrateError> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> Result<Self, MigrateError> {
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Database file '{}' does not exist", path.display()),
            )
            .into());
        }

        let conn = Connection::open_with_flags(path, flags)?;
        info!("Database opened at: {}", path.display());

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Explicit close so that errors surfacing at close time are reported
    /// instead of being swallowed by `Drop`.
    pub fn close(self) -> Result<(), MigrateError> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| MigrateError::DatabaseError(e))?;
        debug!("Database closed: {}", path.display());
        Ok(())
    }
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, MigrateError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table],
            |row| row.get(0),
        )
        .optional()?;

    Ok(found.is_some())
}

/// Reads every row of `table`. The table must exist.
pub fn read_table(conn: &Connection, table: &str) -> Result<Table, MigrateError> {
    if !table_exists(conn, table)? {
        return Err(MigrateError::Error(format!("No such table: {}", table)));
    }

    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(table)))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..column_count)
                .map(|i| row.get::<_, Value>(i))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Read {} rows from {}", rows.len(), table);

    Ok(Table {
        name: table.to_owned(),
        columns,
        rows,
    })
}

/// Quotes an SQL identifier, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch_db(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("jim.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE PrefixList (GuildID TEXT, Prefix TEXT);
             INSERT INTO PrefixList VALUES ('G1', '-mod');
             INSERT INTO PrefixList VALUES ('G2', NULL);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.db");

        let result = Database::open(&path);
        assert!(matches!(
            result,
            Err(MigrateError::IoError(ref e)) if e.kind() == io::ErrorKind::NotFound
        ));
        assert!(!path.exists(), "Opening must not create the file");
    }

    #[test]
    fn test_read_table_preserves_columns_and_rows() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_read_only(&scratch_db(&dir)).unwrap();

        let table = read_table(db.conn(), "PrefixList").unwrap();
        assert_eq!(table.columns, vec!["GuildID", "Prefix"]);
        assert_eq!(
            table.rows,
            vec![
                vec![Value::Text("G1".into()), Value::Text("-mod".into())],
                vec![Value::Text("G2".into()), Value::Null],
            ]
        );
        assert_eq!(table.column_index("Prefix"), Some(1));
        assert_eq!(table.column_index("Message"), None);
    }

    #[test]
    fn test_read_unknown_table_fails() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_read_only(&scratch_db(&dir)).unwrap();

        assert!(!table_exists(db.conn(), "GuildSettings").unwrap());
        assert!(read_table(db.conn(), "GuildSettings").is_err());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Settings"), "\"Settings\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
