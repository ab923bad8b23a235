use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info, Level};
use logging_timer::timer;

use crate::error::MigrateError;
use crate::tsv::{self, Record};

/// Keys of the wide row, in output order. The guild id precedes them.
pub const WIDE_COLUMNS: [&str; 11] = [
    "modlog",
    "modlogchannelid",
    "holdingroom",
    "holdingroomroleid",
    "holdingroomminutes",
    "invitelinkremover",
    "welcomemessage",
    "message",
    "welcomemessagechannelid",
    "prefix",
    "silentcommands",
];

/// Guild id → (key → value), guilds in the order they first appear.
pub type GuildGroups = IndexMap<String, HashMap<String, String>>;

pub struct Reflattener;

impl Reflattener {
    /// Reads the key-value export at `input` and writes one wide row per
    /// guild to `output`. Nothing is written unless every guild is complete.
    pub fn reflatten(input: &Path, output: &Path) -> Result<usize, MigrateError> {
        let _tmr = timer!(Level::Debug; "Reflattener::reflatten", "{}", input.display());

        let records = tsv::read_records(input)?;
        debug!("Read {} record(s) from {}", records.len(), input.display());

        let groups = group_by_guild(&records)?;
        let rows = wide_rows(&groups)?;

        let mut writer = BufWriter::new(File::create(output)?);
        tsv::write_records(&mut writer, &rows)?;

        info!(
            "Wrote {} guild row(s) from {} to {}",
            rows.len(),
            input.display(),
            output.display()
        );

        Ok(rows.len())
    }
}

/// Maps a key from the key-value export to its wide column name.
pub fn rename_key(key: &str) -> &str {
    match key {
        "modlogactive" => "modlog",
        "holdingroomactive" => "holdingroom",
        "welcomemessageactive" => "welcomemessage",
        "welcomemessage" => "message",
        other => other,
    }
}

/// Groups `(GuildID, Key, Value)` records by guild. The first record is the
/// header and is skipped, as are blank lines.
pub fn group_by_guild(records: &[Record]) -> Result<GuildGroups, MigrateError> {
    let mut groups = GuildGroups::new();

    for (idx, record) in records.iter().enumerate().skip(1) {
        if record.is_empty() {
            continue;
        }

        let [guild_id, key, value] = record.as_slice() else {
            return Err(MigrateError::MalformedRow {
                record: idx + 1,
                fields: record.len(),
            });
        };

        groups
            .entry(guild_id.clone())
            .or_default()
            .insert(rename_key(key).to_owned(), value.clone());
    }

    Ok(groups)
}

/// Builds one row per guild: the guild id, then `WIDE_COLUMNS` in order.
pub fn wide_rows(groups: &GuildGroups) -> Result<Vec<Record>, MigrateError> {
    groups
        .iter()
        .map(|(guild_id, settings)| -> Result<Record, MigrateError> {
            let mut row = Vec::with_capacity(WIDE_COLUMNS.len() + 1);
            row.push(guild_id.clone());
            for key in WIDE_COLUMNS {
                let value = settings.get(key).ok_or_else(|| MigrateError::MissingKey {
                    guild_id: guild_id.clone(),
                    key: key.to_owned(),
                })?;
                row.push(value.clone());
            }
            Ok(row)
        })
        .collect()
}
