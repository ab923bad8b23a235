use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::schema::Revision;

pub static CONFIG: OnceCell<Config> = OnceCell::new();

const ENV_PREFIX: &str = "JIM_MIGRATE_";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const DEFAULT_LEVEL: &str = "info";

    fn default() -> Self {
        LoggingConfig {
            level: Self::DEFAULT_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.level.clone();
        self.level = self.level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.level.as_str()) {
            eprintln!(
                "Config error: log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::DEFAULT_LEVEL
            );
            self.level = Self::DEFAULT_LEVEL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FlattenConfig {
    revision: String,
}

impl FlattenConfig {
    pub fn revision(&self) -> Revision {
        // ensure_valid has already run, so anything unparseable here can only
        // be the default
        Revision::from_str_opt(&self.revision).unwrap_or(Revision::V3)
    }

    fn default() -> Self {
        FlattenConfig {
            revision: Revision::V3.as_str().to_owned(),
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.revision.clone();
        self.revision = self.revision.trim().to_ascii_lowercase();
        if Revision::from_str_opt(&self.revision).is_none() {
            eprintln!(
                "Config error: flatten revision of '{}' is invalid - using default of '{}'",
                str_original,
                Revision::V3.as_str()
            );
            self.revision = Revision::V3.as_str().to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReflattenConfig {
    pub output: String,
}

impl ReflattenConfig {
    const DEFAULT_OUTPUT: &str = "output.tsv";

    fn default() -> Self {
        ReflattenConfig {
            output: Self::DEFAULT_OUTPUT.to_owned(),
        }
    }

    fn ensure_valid(&mut self) {
        if self.output.trim().is_empty() {
            eprintln!(
                "Config error: reflatten output is empty - using default of '{}'",
                Self::DEFAULT_OUTPUT
            );
            self.output = Self::DEFAULT_OUTPUT.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub logging: LoggingConfig,
    pub flatten: FlattenConfig,
    pub reflatten: ReflattenConfig,
}

impl Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            flatten: FlattenConfig::default(),
            reflatten: ReflattenConfig::default(),
        }
    }

    /// Loads the configuration from `config_path` if given, otherwise from
    /// `config.toml` in the platform config directory. Environment variables
    /// prefixed with `JIM_MIGRATE_` override file values (`__` separates
    /// sections, e.g. `JIM_MIGRATE_LOGGING__LEVEL=debug`).
    /// A missing file is not an error; an unreadable one falls back to defaults.
    pub fn load_config(config_path: Option<&Path>) -> Self {
        let config_path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);

        let default_config = Config::default();

        let mut figment = Figment::from(Serialized::defaults(default_config.clone()));
        if let Some(path) = &config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load configuration ({}): {}. Using default configuration.",
                config_path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "no config file".to_owned()),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    /// Returns the process-wide configuration, loading it from the default
    /// location on first use.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| Config::load_config(None))
    }

    /// Installs `config` as the process-wide configuration. If one was
    /// already installed, the existing one wins.
    pub fn install(config: Config) -> &'static Config {
        CONFIG.get_or_init(|| config)
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "jim-migrate").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.flatten.ensure_valid();
        self.reflatten.ensure_valid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load_config(Some(Path::new("missing.toml")));
            assert_eq!(config.logging.level, "info");
            assert_eq!(config.flatten.revision(), Revision::V3);
            assert_eq!(config.reflatten.output, "output.tsv");
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [logging]
                level = "DEBUG"

                [flatten]
                revision = "v2"

                [reflatten]
                output = "guilds.tsv"
                "#,
            )?;

            let config = Config::load_config(Some(Path::new("config.toml")));
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.flatten.revision(), Revision::V2);
            assert_eq!(config.reflatten.output, "guilds.tsv");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[logging]\nlevel = \"warn\"\n")?;
            jail.set_env("JIM_MIGRATE_LOGGING__LEVEL", "trace");
            jail.set_env("JIM_MIGRATE_REFLATTEN__OUTPUT", "env.tsv");

            let config = Config::load_config(Some(Path::new("config.toml")));
            assert_eq!(config.logging.level, "trace");
            assert_eq!(config.reflatten.output, "env.tsv");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[logging]\nlevel = \"loud\"\n\n[flatten]\nrevision = \"v9\"\n\n[reflatten]\noutput = \"  \"\n",
            )?;

            let config = Config::load_config(Some(Path::new("config.toml")));
            assert_eq!(config.logging.level, "info");
            assert_eq!(config.flatten.revision(), Revision::V3);
            assert_eq!(config.reflatten.output, "output.tsv");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[logging\nlevel = ")?;

            let config = Config::load_config(Some(Path::new("config.toml")));
            assert_eq!(config.logging.level, "info");
            Ok(())
        });
    }
}
