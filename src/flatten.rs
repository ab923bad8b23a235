use log::{debug, info, warn, Level};
use logging_timer::timer;
use rusqlite::types::Value;
use rusqlite::{params, Connection};

use crate::database::{self, Database, Table};
use crate::error::MigrateError;
use crate::schema::{
    Migration, Revision, RuleFn, GUILD_ID, PREFIX_LIST, SETTINGS, SOURCE_TABLES, WELCOME_MESSAGES,
};

/// Counts reported at the end of a flatten run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlattenSummary {
    pub pruned: usize,
    pub rows_read: usize,
    pub settings_written: usize,
}

pub struct Flattener;

impl Flattener {
    /// Flattens the legacy tables of the database at `db` into `Settings`
    /// using the given revision's rules. The whole run is one transaction:
    /// on any error nothing is written.
    pub fn flatten(db: &mut Database, revision: Revision) -> Result<FlattenSummary, MigrateError> {
        let _tmr = timer!(Level::Debug; "Flattener::flatten", "{} {}", revision.as_str(), db.path().display());
        let migration = revision.migration();

        info!(
            "Flattening {} with revision {}",
            db.path().display(),
            migration.revision.as_str()
        );

        let tx = db.conn_mut().transaction()?;
        let summary = Self::run_migration(&tx, migration)?;
        tx.commit()?;

        info!(
            "Flatten complete: pruned {} welcome message(s), read {} row(s), wrote {} setting(s)",
            summary.pruned, summary.rows_read, summary.settings_written
        );

        Ok(summary)
    }

    fn run_migration(conn: &Connection, migration: &Migration) -> Result<FlattenSummary, MigrateError> {
        let mut summary = FlattenSummary::default();

        // Phase 1: prune
        if let Some(prune_sql) = migration.prune_sql {
            summary.pruned = Self::prune(conn, prune_sql)?;
        }

        // Phase 2: destination table
        conn.execute_batch(migration.create_sql)?;

        // Phase 3: copy every source table through the rules
        for table_name in SOURCE_TABLES {
            if !database::table_exists(conn, table_name)? {
                warn!("Table {} not found - skipping", table_name);
                continue;
            }

            let table = database::read_table(conn, table_name)?;
            summary.rows_read += table.rows.len();
            let written = Self::flatten_table(conn, &table, migration.rule_fn)?;
            info!(
                "{}: {} row(s) flattened into {} setting(s)",
                table_name,
                table.rows.len(),
                written
            );
            summary.settings_written += written;
        }

        Ok(summary)
    }

    fn prune(conn: &Connection, prune_sql: &str) -> Result<usize, MigrateError> {
        for table in [WELCOME_MESSAGES, PREFIX_LIST] {
            if !database::table_exists(conn, table)? {
                warn!("Table {} not found - skipping welcome message pruning", table);
                return Ok(0);
            }
        }

        let pruned = conn.execute(prune_sql, [])?;
        debug!("Pruned {} orphaned welcome message(s)", pruned);
        Ok(pruned)
    }

    /// Inserts one `Settings` row per (row, non-GuildID field), or two when a
    /// rule derives an extra key. Returns the number of rows inserted.
    fn flatten_table(conn: &Connection, table: &Table, rule_fn: RuleFn) -> Result<usize, MigrateError> {
        let guild_idx = table.column_index(GUILD_ID).ok_or_else(|| {
            MigrateError::Error(format!("Table {} has no {} column", table.name, GUILD_ID))
        })?;

        // SQLite renders the value, so reals come out exactly as TEXT affinity
        // would store them
        let mut insert_stmt = conn.prepare(&format!(
            "INSERT INTO {} (GuildID, Key, Value) VALUES (?, ?, CAST(? AS TEXT))",
            database::quote_ident(SETTINGS)
        ))?;

        let mut written = 0;
        for (row_num, row) in table.rows.iter().enumerate() {
            let guild_id = guild_id_text(&row[guild_idx]).ok_or_else(|| {
                MigrateError::Error(format!(
                    "Row {} of {} has no {}",
                    row_num + 1,
                    table.name,
                    GUILD_ID
                ))
            })?;

            for (field, value) in table.columns.iter().zip(row.iter()) {
                if field == GUILD_ID {
                    continue;
                }

                let rule = rule_fn(&table.name, field);
                for (key, value) in rule.apply(field, value) {
                    insert_stmt.execute(params![guild_id, key, value])?;
                    written += 1;
                }
            }
        }

        Ok(written)
    }
}

/// Guild ids were written both as text and as bare integers over the years.
fn guild_id_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}
