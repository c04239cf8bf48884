//! Daemon configuration schemas.
//!
//! All configuration structs are deserialized from a TOML file via the
//! `config` crate, overlaid with `NOTIFYD__`-prefixed environment variables.
//! Each sub-module represents a logical configuration section, and every
//! section has defaults so an empty file is a valid configuration.

pub mod control;
pub mod dnd;
pub mod general;
pub mod history;
pub mod logging;
pub mod rules;
pub mod timeouts;

use serde::{Deserialize, Serialize};

pub use self::control::ControlConfig;
pub use self::dnd::{DndConfig, DndWindowConfig, Weekday};
pub use self::general::{GeneralConfig, SortOrder};
pub use self::history::HistoryConfig;
pub use self::logging::LoggingConfig;
pub use self::rules::{Pattern, RuleActions, RuleConfig, RuleCriteria};
pub use self::timeouts::TimeoutConfig;

use crate::error::AppError;

/// Root daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display and admission settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Per-urgency default timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// History archive settings.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Do-Not-Disturb settings.
    #[serde(default)]
    pub dnd: DndConfig,
    /// Ordered rule list.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Control socket settings.
    #[serde(default)]
    pub control: ControlConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; variables such as `NOTIFYD__GENERAL__MAX_VISIBLE`
    /// override file values. The result is validated before it is returned.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("NOTIFYD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that can only be checked after deserialization:
    /// rule patterns compile and DND windows are well-formed.
    pub fn validate(&self) -> Result<(), AppError> {
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate().map_err(|e| {
                AppError::configuration(format!("{}: {}", rule.label(index), e.message))
            })?;
        }
        for window in &self.dnd.schedule {
            window.parse_times()?;
        }
        if let Some(hard) = self.general.active_hard_limit {
            if hard == 0 {
                return Err(AppError::configuration(
                    "general.active_hard_limit must be at least 1",
                ));
            }
        }
        Ok(())
    }
}
