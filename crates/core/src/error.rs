use thiserror::Error;
use uuid::Uuid;

pub type CampaignResult<T> = Result<T, CampaignError>;

/// Failures reported by a persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Persistence backend unavailable: {0}")]
    Unavailable(String),

    #[error("Persistence backend rejected the campaign: {0}")]
    Rejected(String),

    #[error("Campaign {0} not found")]
    NotFound(Uuid),

    #[error("Persistence call timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid transition: cannot {action} from {state}")]
    InvalidTransition { state: String, action: &'static str },

    #[error("Publish already in progress")]
    PublishInFlight,

    #[error("Identity conflict: draft is bound to {bound}, backend returned {returned}")]
    IdentityConflict { bound: Uuid, returned: Uuid },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for CampaignError {
    fn from(err: config::ConfigError) -> Self {
        CampaignError::Config(err.to_string())
    }
}
