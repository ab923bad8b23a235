use super::rules::FieldRule;

/// Revision 1: first cut of the key-value table. No key, no pruning, every
/// field copied as-is.
pub const CREATE_SETTINGS_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Settings (
    GuildID TEXT NOT NULL,
    Key     TEXT NOT NULL,
    Value   TEXT
);
"#;

pub fn rule_v1(_table: &str, _field: &str) -> FieldRule {
    FieldRule::Pass
}
