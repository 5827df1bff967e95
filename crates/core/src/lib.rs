//! Campaign draft model, persisted record shape, typed edit commands,
//! error taxonomy and configuration shared by the authoring wizard.

pub mod commands;
pub mod config;
pub mod draft;
pub mod error;
pub mod field;
pub mod record;

pub use commands::{AudienceChange, ChannelChoice, ContentItemChange, DraftCommand};
pub use config::AppConfig;
pub use draft::CampaignDraft;
pub use error::{CampaignError, CampaignResult, PersistenceError};
pub use field::{FieldError, FieldKey};
pub use record::CampaignRecord;
