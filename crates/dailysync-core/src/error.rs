use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set or empty")]
    MissingSetting { name: &'static str },

    #[error("Invalid value for {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("Config file not found: {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    Load(String),
}

impl ConfigError {
    /// Short error code string used in log records.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::MissingSetting { .. } => "MISSING_SETTING",
            ConfigError::InvalidSetting { .. } => "INVALID_SETTING",
            ConfigError::ConfigFileNotFound { .. } => "CONFIG_FILE_NOT_FOUND",
            ConfigError::Load(_) => "CONFIG_LOAD_ERROR",
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
