use thiserror::Error;

use crate::core::types::PlayerId;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Rule '{rule}' rejected: {reason}")]
    RuleRejected { rule: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;
