mod base;
mod rules;
mod v1;
mod v2;
mod v3;

use clap::ValueEnum;

/// Decides what a source field becomes, given its table and column name.
pub type RuleFn = fn(&str, &str) -> FieldRule;

pub use base::{GUILD_ID, GUILD_SETTINGS, PREFIX_LIST, SETTINGS, SOURCE_TABLES, WELCOME_MESSAGES};
#[cfg(test)]
pub use base::LEGACY_SCHEMA_SQL;
pub use rules::FieldRule;
#[cfg(test)]
pub use rules::{DEFAULT_WELCOME_MESSAGE, LEGACY_WELCOME_MESSAGE};
use v1::{rule_v1, CREATE_SETTINGS_V1_SQL};
use v2::{rule_v2, CREATE_SETTINGS_V2_SQL, PRUNE_WELCOME_MESSAGES_SQL};
use v3::{rule_v3, CREATE_SETTINGS_V3_SQL};

/// The flattener as it stood at each point in the bot's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Revision {
    V1,
    V2,
    V3,
}

impl Revision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Revision::V1 => "v1",
            Revision::V2 => "v2",
            Revision::V3 => "v3",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Some(Revision::V1),
            "v2" => Some(Revision::V2),
            "v3" => Some(Revision::V3),
            _ => None,
        }
    }

    pub fn migration(&self) -> &'static Migration {
        match self {
            Revision::V1 => &MIGRATION_V1,
            Revision::V2 => &MIGRATION_V2,
            Revision::V3 => &MIGRATION_V3,
        }
    }
}

/// Migration descriptor, run in three phases:
/// - prune_sql: statement deleting rows that must not be carried over (optional)
/// - create_sql: SQL batch creating the destination table
/// - rule_fn: per-field rule applied while copying rows into `Settings`
pub struct Migration {
    pub revision: Revision,
    pub prune_sql: Option<&'static str>,
    pub create_sql: &'static str,
    pub rule_fn: RuleFn,
}

pub const MIGRATION_V1: Migration = Migration {
    revision: Revision::V1,
    prune_sql: None,
    create_sql: CREATE_SETTINGS_V1_SQL,
    rule_fn: rule_v1,
};

pub const MIGRATION_V2: Migration = Migration {
    revision: Revision::V2,
    prune_sql: Some(PRUNE_WELCOME_MESSAGES_SQL),
    create_sql: CREATE_SETTINGS_V2_SQL,
    rule_fn: rule_v2,
};

pub const MIGRATION_V3: Migration = Migration {
    revision: Revision::V3,
    prune_sql: Some(PRUNE_WELCOME_MESSAGES_SQL),
    create_sql: CREATE_SETTINGS_V3_SQL,
    rule_fn: rule_v3,
};
