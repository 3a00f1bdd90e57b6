use thiserror::Error;

/// Failures at the I/O boundary of the simulation core.
///
/// Gameplay conditions (not enough gold, cooldowns, missing entities) are not
/// errors; those operations report through their boolean return instead.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
