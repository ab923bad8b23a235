use super::base::GUILD_SETTINGS;
use super::rules::FieldRule;

/// Revision 2: welcome messages left behind by guilds that removed the bot
/// are dropped first. Their guilds no longer have a prefix row.
pub const PRUNE_WELCOME_MESSAGES_SQL: &str = r#"
DELETE FROM WelcomeMessages
WHERE GuildID NOT IN (SELECT GuildID FROM PrefixList WHERE GuildID IS NOT NULL);
"#;

pub const CREATE_SETTINGS_V2_SQL: &str = super::v1::CREATE_SETTINGS_V1_SQL;

pub fn rule_v2(table: &str, field: &str) -> FieldRule {
    match (table, field) {
        (GUILD_SETTINGS, "ModLogActive") => FieldRule::Flag,
        (GUILD_SETTINGS, "HoldingRoomActive") => FieldRule::Flag,
        (GUILD_SETTINGS, "HoldingRoomMinutes") => FieldRule::Number,
        _ => FieldRule::Pass,
    }
}
