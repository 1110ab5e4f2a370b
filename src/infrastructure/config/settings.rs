//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is read from an optional TOML file, then overridden by
//! environment variables (the container sets `PORT`, `DB_PATH` and
//! `JOB_DB_PATH`), then validated. The bot token is only ever read from
//! `BOT_TOKEN`.
//!
//! # Example
//!
//! ```no_run
//! use sessionvault::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::storage::StorageConfig;
use super::telegram::TelegramSettings;
use crate::application::BroadcastPacing;
use crate::error::{ConfigError, Result};

/// Config file read when no `--config` is given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Longest accepted pause between broadcast batches.
pub const MAX_BROADCAST_PAUSE_SECS: f64 = 3600.0;

/// Longest accepted delay for overdue jobs restored at startup.
pub const MAX_RESTORE_GRACE_SECS: u64 = 86_400;

/// Broadcast pacing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Messages sent between pauses.
    pub batch: usize,
    /// Pause length in seconds.
    pub pause_secs: f64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            batch: 12,
            pause_secs: 1.0,
        }
    }
}

impl BroadcastConfig {
    #[must_use]
    pub fn pacing(&self) -> BroadcastPacing {
        BroadcastPacing {
            batch: self.batch,
            pause: std::time::Duration::try_from_secs_f64(
                self.pause_secs.clamp(0.0, MAX_BROADCAST_PAUSE_SECS),
            )
            .unwrap_or_default(),
        }
    }
}

/// Deletion scheduler settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay before overdue jobs found at startup fire.
    pub restore_grace_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            restore_grace_secs: 5,
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn restore_grace(&self) -> chrono::Duration {
        let secs = self.restore_grace_secs.min(MAX_RESTORE_GRACE_SECS);
        chrono::Duration::try_seconds(i64::try_from(secs).unwrap_or_default()).unwrap_or_default()
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot identity, owner and channels.
    pub telegram: TelegramSettings,
    /// Health endpoint binding.
    pub server: ServerConfig,
    /// SQLite file locations.
    pub storage: StorageConfig,
    pub broadcast: BroadcastConfig,
    pub scheduler: SchedulerConfig,
    /// Logging and tracing configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content with process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, an override does not
    /// parse, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |key| std::env::var(key).ok())
    }

    /// Parse configuration from TOML content, reading overrides through `env`.
    ///
    /// Blank environment values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`Config::parse_toml`].
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_env<F>(content: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        // Never read from the config file.
        config.telegram.bot_token = env("BOT_TOKEN");

        if let Some(value) = env("OWNER_ID") {
            config.telegram.owner_id = Some(parse_env("OWNER_ID", &value)?);
        }
        if let Some(value) = env("UPLOAD_CHANNEL_ID") {
            config.telegram.upload_channel = Some(value);
        }
        if let Some(value) = env("DB_CHANNEL_ID") {
            config.telegram.db_channel = Some(value);
        }
        if let Some(value) = env("FORCE_JOIN_BUTTON_TEXT") {
            config.telegram.force_join_button_text = value;
        }
        if let Some(value) = env("HOST") {
            config.server.host = value;
        }
        if let Some(value) = env("PORT") {
            config.server.port = parse_env("PORT", &value)?;
        }
        if let Some(value) = env("DB_PATH") {
            config.storage.database = value;
        }
        if let Some(value) = env("JOB_DB_PATH") {
            config.storage.job_database = Some(value);
        }
        if let Some(value) = env("BROADCAST_BATCH") {
            config.broadcast.batch = parse_env("BROADCAST_BATCH", &value)?;
        }
        if let Some(value) = env("BROADCAST_PAUSE") {
            config.broadcast.pause_secs = parse_env("BROADCAST_PAUSE", &value)?;
        }
        if let Some(value) = env("LOG_LEVEL") {
            config.logging.level = value;
        }
        if let Some(value) = env("LOG_FORMAT") {
            config.logging.format = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or from `config.toml` when it exists.
    ///
    /// With neither, configuration comes from the environment alone.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file cannot be read or the result
    /// does not validate.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                std::fs::read_to_string(DEFAULT_CONFIG_PATH).map_err(ConfigError::ReadFile)?
            }
            None => String::new(),
        };
        Self::parse_toml(&content)
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.telegram.owner_id.is_none() {
            return Err(ConfigError::MissingField { field: "OWNER_ID" }.into());
        }
        self.telegram.upload_channel()?;
        self.telegram.db_channel()?;

        if self.broadcast.batch == 0 {
            return Err(ConfigError::InvalidValue {
                field: "broadcast.batch",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !(0.0..=MAX_BROADCAST_PAUSE_SECS).contains(&self.broadcast.pause_secs) {
            return Err(ConfigError::InvalidValue {
                field: "broadcast.pause_secs",
                reason: format!("must be between 0 and {MAX_BROADCAST_PAUSE_SECS} seconds"),
            }
            .into());
        }
        if self.scheduler.restore_grace_secs > MAX_RESTORE_GRACE_SECS {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.restore_grace_secs",
                reason: format!("must be at most {MAX_RESTORE_GRACE_SECS} seconds"),
            }
            .into());
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "PORT",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.storage.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "DB_PATH" }.into());
        }
        Ok(())
    }
}

#[allow(clippy::result_large_err)]
fn parse_env<T>(field: &'static str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatRef;
    use crate::error::Error;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[("OWNER_ID", "42"), ("UPLOAD_CHANNEL_ID", "-1001")];

    #[test]
    fn environment_alone_is_enough() {
        let config = Config::parse_toml_with_env("", env(MINIMAL)).unwrap();
        assert_eq!(config.telegram.owner_id, Some(42));
        assert_eq!(config.telegram.upload_channel().unwrap(), ChatRef::Id(-1001));
        assert_eq!(config.telegram.db_channel().unwrap(), None);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.database, "bot_data.sqlite3");
        assert_eq!(config.storage.job_database_path(), "bot_data.sqlite3");
        assert_eq!(config.broadcast.batch, 12);
        assert_eq!(config.telegram.force_join_button_text, "Join Channel");
        assert_eq!(config.scheduler.restore_grace(), chrono::Duration::seconds(5));
    }

    #[test]
    fn environment_overrides_file() {
        let toml = r#"
            [telegram]
            owner_id = 1
            upload_channel = "@uploads"

            [server]
            port = 9000

            [storage]
            database = "vault.sqlite3"
        "#;
        let config = Config::parse_toml_with_env(
            toml,
            env(&[
                ("OWNER_ID", "7"),
                ("PORT", "10000"),
                ("DB_PATH", "/data/database.sqlite3"),
                ("JOB_DB_PATH", "/data/jobs.sqlite"),
            ]),
        )
        .unwrap();

        assert_eq!(config.telegram.owner_id, Some(7));
        assert_eq!(
            config.telegram.upload_channel().unwrap(),
            ChatRef::Username("@uploads".into())
        );
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.storage.database, "/data/database.sqlite3");
        assert_eq!(config.storage.job_database_path(), "/data/jobs.sqlite");
    }

    #[test]
    fn bot_token_is_env_only() {
        let toml = "[telegram]\nbot_token = \"from-file\"\nowner_id = 1\nupload_channel = \"-1\"";
        let config = Config::parse_toml_with_env(toml, env(&[])).unwrap();
        assert!(config.telegram.bot_token.is_none());
        assert!(config.telegram.bot_token().is_err());

        let config = Config::parse_toml_with_env(toml, env(&[("BOT_TOKEN", "123:abc")])).unwrap();
        assert_eq!(config.telegram.bot_token().unwrap(), "123:abc");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("PORT", "  "));
        let config = Config::parse_toml_with_env("", env(&pairs)).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn missing_owner_is_rejected() {
        let err = Config::parse_toml_with_env("", env(&[("UPLOAD_CHANNEL_ID", "-1")])).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { field: "OWNER_ID" })
        ));
    }

    #[test]
    fn missing_upload_channel_is_rejected() {
        let err = Config::parse_toml_with_env("", env(&[("OWNER_ID", "1")])).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField {
                field: "UPLOAD_CHANNEL_ID"
            })
        ));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::parse_toml_with_env("", env(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "PORT", .. })
        ));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("BROADCAST_BATCH", "0"));
        let err = Config::parse_toml_with_env("", env(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "broadcast.batch",
                ..
            })
        ));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("BROADCAST_PAUSE", "-1"));
        assert!(Config::parse_toml_with_env("", env(&pairs)).is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml_with_env("[telegram", env(MINIMAL)).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn pacing_uses_fractional_seconds() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("BROADCAST_PAUSE", "0.5"));
        let config = Config::parse_toml_with_env("", env(&pairs)).unwrap();
        let pacing = config.broadcast.pacing();
        assert_eq!(pacing.batch, 12);
        assert_eq!(pacing.pause, std::time::Duration::from_millis(500));
    }

    #[test]
    fn huge_broadcast_pause_is_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("BROADCAST_PAUSE", "1e20"));
        let err = Config::parse_toml_with_env("", env(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "broadcast.pause_secs",
                ..
            })
        ));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("BROADCAST_PAUSE", "NaN"));
        assert!(Config::parse_toml_with_env("", env(&pairs)).is_err());
    }

    #[test]
    fn huge_restore_grace_is_rejected() {
        let err = Config::parse_toml_with_env(
            "[scheduler]\nrestore_grace_secs = 9223372036854775807\n",
            env(MINIMAL),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "scheduler.restore_grace_secs",
                ..
            })
        ));
    }

    #[test]
    fn durations_never_panic_on_unvalidated_values() {
        let broadcast = BroadcastConfig {
            batch: 1,
            pause_secs: 1e20,
        };
        assert_eq!(
            broadcast.pacing().pause,
            std::time::Duration::from_secs_f64(MAX_BROADCAST_PAUSE_SECS)
        );
        let broadcast = BroadcastConfig {
            batch: 1,
            pause_secs: f64::NAN,
        };
        assert_eq!(broadcast.pacing().pause, std::time::Duration::ZERO);

        let scheduler = SchedulerConfig {
            restore_grace_secs: u64::MAX,
        };
        assert_eq!(
            scheduler.restore_grace(),
            chrono::Duration::seconds(86_400)
        );
    }

    #[test]
    fn limits_themselves_are_accepted() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("BROADCAST_PAUSE", "3600"));
        let config = Config::parse_toml_with_env(
            "[scheduler]\nrestore_grace_secs = 86400\n",
            env(&pairs),
        )
        .unwrap();
        assert_eq!(config.broadcast.pacing().pause, std::time::Duration::from_secs(3600));
        assert_eq!(config.scheduler.restore_grace(), chrono::Duration::days(1));
    }
}
