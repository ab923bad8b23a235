use super::base::{GUILD_SETTINGS, WELCOME_MESSAGES};
use super::rules::FieldRule;

/// Revision 3 (final): `(GuildID, Key)` becomes the primary key, so running
/// twice against the same file fails instead of duplicating settings.
pub const CREATE_SETTINGS_V3_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Settings (
    GuildID TEXT NOT NULL,
    Key     TEXT NOT NULL,
    Value   TEXT,
    PRIMARY KEY (GuildID, Key)
);
"#;

/// The holding room channel doubled as the welcome channel, and turning the
/// holding room on also turned the welcome message on. Both are split out
/// here; everything else follows revision 2.
pub fn rule_v3(table: &str, field: &str) -> FieldRule {
    match (table, field) {
        (GUILD_SETTINGS, "HoldingRoomActive") => FieldRule::FlagWithDerived("WelcomeMessageActive"),
        (GUILD_SETTINGS, "HoldingRoomChannelID") => FieldRule::Rename("WelcomeMessageChannelID"),
        (WELCOME_MESSAGES, "Message") => FieldRule::WelcomeMessage("WelcomeMessage"),
        _ => super::v2::rule_v2(table, field),
    }
}
