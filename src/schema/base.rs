//! Table and column names of the legacy relational layout, and the column
//! every source table shares.

pub const GUILD_SETTINGS: &str = "GuildSettings";
pub const PREFIX_LIST: &str = "PrefixList";
pub const WELCOME_MESSAGES: &str = "WelcomeMessages";
pub const SETTINGS: &str = "Settings";

pub const GUILD_ID: &str = "GuildID";

/// Source tables flattened into `Settings`, in the order they are read.
pub const SOURCE_TABLES: [&str; 3] = [GUILD_SETTINGS, PREFIX_LIST, WELCOME_MESSAGES];

/// The legacy layout as the bot created it. Only used to build fixtures; the
/// flattener discovers columns from the file it is given.
#[cfg(test)]
pub const LEGACY_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS GuildSettings (
    GuildID              TEXT PRIMARY KEY,
    SilentCommands       INTEGER,
    InviteLinkRemover    INTEGER,
    ModLogActive         INTEGER,
    ModLogChannelID      TEXT,
    HoldingRoomRoleID    TEXT,
    HoldingRoomActive    INTEGER,
    HoldingRoomChannelID TEXT,
    HoldingRoomMinutes   INTEGER
);

CREATE TABLE IF NOT EXISTS PrefixList (
    GuildID TEXT PRIMARY KEY,
    Prefix  TEXT
);

CREATE TABLE IF NOT EXISTS WelcomeMessages (
    GuildID TEXT PRIMARY KEY,
    Message TEXT
);
"#;
