use rusqlite::types::Value;

/// Welcome message the bot used to seed every guild with before the holding
/// room and the welcome message were split into separate features.
pub const LEGACY_WELCOME_MESSAGE: &str = "Welcome to $guild $user. You are in our holding room for $minute, please take this time to review our rules.";
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to $guild $user!";

/// What happens to one source field on its way into `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Same key, value unchanged.
    Pass,
    /// New key, value unchanged.
    Rename(&'static str),
    /// Same key, integer flag as `"true"`/`"false"`.
    Flag,
    /// Same key, numeric value; numeric text is trimmed.
    Number,
    /// As `Flag`, and the same value again under a second key.
    FlagWithDerived(&'static str),
    /// New key; the legacy default body is replaced with the current default.
    WelcomeMessage(&'static str),
}

/// One `(Key, Value)` pair destined for `Settings`. The value is still a
/// SQLite value: the insert casts it to TEXT, so numbers are rendered by
/// SQLite itself.
pub type Setting = (String, Value);

impl FieldRule {
    pub fn apply(&self, field: &str, value: &Value) -> Vec<Setting> {
        match *self {
            FieldRule::Pass => vec![(field.to_owned(), value.clone())],
            FieldRule::Rename(key) => vec![(key.to_owned(), value.clone())],
            FieldRule::Flag => vec![(field.to_owned(), flag_value(value))],
            FieldRule::Number => vec![(field.to_owned(), number_value(value))],
            FieldRule::FlagWithDerived(derived) => {
                let flag = flag_value(value);
                vec![(field.to_owned(), flag.clone()), (derived.to_owned(), flag)]
            }
            FieldRule::WelcomeMessage(key) => {
                let message = match value {
                    Value::Text(body) if body == LEGACY_WELCOME_MESSAGE => {
                        Value::Text(DEFAULT_WELCOME_MESSAGE.to_owned())
                    }
                    other => other.clone(),
                };
                vec![(key.to_owned(), message)]
            }
        }
    }
}

pub fn flag_value(value: &Value) -> Value {
    let set = match value {
        Value::Null => false,
        Value::Integer(i) => *i != 0,
        Value::Real(f) => *f != 0.0,
        Value::Text(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.parse::<i64>().is_ok_and(|i| i != 0)
        }
        Value::Blob(_) => false,
    };

    let text = if set { "true" } else { "false" };
    Value::Text(text.to_owned())
}

pub fn number_value(value: &Value) -> Value {
    match value {
        Value::Text(s) => Value::Text(s.trim().to_owned()),
        other => other.clone(),
    }
}
