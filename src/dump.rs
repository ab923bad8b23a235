use std::io::Write;

use log::Level;
use logging_timer::timer;
use rusqlite::types::Value;

use crate::database::{self, Database};
use crate::error::MigrateError;

pub struct Dump;

impl Dump {
    /// Writes every row of `table` to `out`, one tuple per line.
    pub fn dump_table<W: Write>(db: &Database, table: &str, out: &mut W) -> Result<usize, MigrateError> {
        let _tmr = timer!(Level::Debug; "Dump::dump_table", "{}", table);

        let table = database::read_table(db.conn(), table)?;
        for row in &table.rows {
            writeln!(out, "{}", format_row(row))?;
        }
        out.flush()?;

        Ok(table.rows.len())
    }
}

pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(format_value).collect();
    format!("({})", cells.join(", "))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_owned(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format!("{:?}", f),
        Value::Text(s) => format!("{:?}", s),
        Value::Blob(b) => format!("x'{}'", hex::encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LEGACY_SCHEMA_SQL;
    use rusqlite::Connection;
    use tempfile::TempDir;

    #[test]
    fn test_format_row() {
        let row = vec![
            Value::Text("G1".into()),
            Value::Integer(1),
            Value::Real(2.0),
            Value::Null,
            Value::Text("say \"hi\"".into()),
            Value::Blob(vec![0xde, 0xad]),
        ];
        assert_eq!(
            format_row(&row),
            r#"("G1", 1, 2.0, NULL, "say \"hi\"", x'dead')"#
        );
    }

    #[test]
    fn test_dump_guild_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jim.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(LEGACY_SCHEMA_SQL).unwrap();
        conn.execute_batch(
            "INSERT INTO GuildSettings (GuildID, ModLogActive, HoldingRoomMinutes) VALUES ('G1', 1, 3);
             INSERT INTO GuildSettings (GuildID, ModLogActive, HoldingRoomMinutes) VALUES ('G2', 0, 5);",
        )
        .unwrap();
        drop(conn);

        let db = Database::open_read_only(&path).unwrap();
        let mut out = Vec::new();
        let count = Dump::dump_table(&db, "GuildSettings", &mut out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "(\"G1\", NULL, NULL, 1, NULL, NULL, NULL, NULL, 3)\n\
             (\"G2\", NULL, NULL, 0, NULL, NULL, NULL, NULL, 5)\n"
        );
    }

    #[test]
    fn test_dump_unknown_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jim.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE PrefixList (GuildID TEXT, Prefix TEXT);")
            .unwrap();

        let db = Database::open_read_only(&path).unwrap();
        let mut out = Vec::new();
        assert!(Dump::dump_table(&db, "GuildSettings", &mut out).is_err());
        assert!(out.is_empty());
    }
}
