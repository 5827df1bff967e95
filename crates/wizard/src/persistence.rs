//! Persistence boundary for the wizard.
//!
//! The controller holds an `Arc<dyn DraftPersistenceAdapter>`; the
//! in-memory [`crate::store::InMemoryCampaignStore`] implements it for
//! development and tests.

use async_trait::async_trait;
use campaign_core::draft::{CampaignDraft, CampaignStatus};
use campaign_core::error::PersistenceError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the backend hands back after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistedCampaign {
    pub id: Uuid,
}

/// Trait for storing campaigns. The draft is passed in its in-memory
/// form; implementations decide the stored shape (usually
/// [`CampaignDraft::to_record`]).
#[async_trait]
pub trait DraftPersistenceAdapter: Send + Sync {
    /// Store a new campaign for publishing. Returns the assigned id.
    async fn create_campaign(&self, draft: &CampaignDraft) -> Result<PersistedCampaign, PersistenceError>;

    /// Overwrite an existing campaign and set its status.
    async fn update_campaign(
        &self,
        id: Uuid,
        draft: &CampaignDraft,
        status: CampaignStatus,
    ) -> Result<PersistedCampaign, PersistenceError>;

    /// Store work in progress. With `id == None` a new draft is created and
    /// its id returned; otherwise the existing campaign is overwritten.
    async fn save_draft(
        &self,
        draft: &CampaignDraft,
        id: Option<Uuid>,
    ) -> Result<PersistedCampaign, PersistenceError>;
}
