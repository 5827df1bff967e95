//! In-memory campaign store backed by DashMap.
//!
//! Implements [`DraftPersistenceAdapter`] for development and tests.
//! Failures and latency can be scripted to exercise the controller's
//! error paths.

use async_trait::async_trait;
use campaign_core::draft::{CampaignDraft, CampaignStatus};
use campaign_core::error::PersistenceError;
use campaign_core::record::CampaignRecord;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::persistence::{DraftPersistenceAdapter, PersistedCampaign};

#[derive(Debug, Clone)]
pub struct StoredCampaign {
    pub record: CampaignRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of writes since creation.
    pub revision: u64,
}

/// Per-operation call counts, including failed calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub create: usize,
    pub update: usize,
    pub save_draft: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.create + self.update + self.save_draft
    }
}

#[derive(Default)]
pub struct InMemoryCampaignStore {
    campaigns: DashMap<Uuid, StoredCampaign>,
    scripted_failures: Mutex<VecDeque<PersistenceError>>,
    latency: Option<Duration>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    draft_saves: AtomicUsize,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        info!("Campaign store initialized (in-memory)");
        Self::default()
    }

    /// Delay every call by `latency` before it completes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call (of any kind) fail with `error`. Multiple calls
    /// queue up in order.
    pub fn fail_next(&self, error: PersistenceError) {
        self.scripted_failures.lock().push_back(error);
    }

    /// Insert an existing record, e.g. one loaded from disk. A record
    /// without an id is given a fresh one.
    pub fn seed(&self, mut record: CampaignRecord) -> Uuid {
        let id = record.id.unwrap_or_else(Uuid::new_v4);
        record.id = Some(id);
        let now = Utc::now();
        self.campaigns.insert(
            id,
            StoredCampaign {
                record,
                created_at: now,
                updated_at: now,
                revision: 0,
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> Option<StoredCampaign> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    pub fn record(&self, id: Uuid) -> Option<CampaignRecord> {
        self.campaigns.get(&id).map(|r| r.record.clone())
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            create: self.creates.load(Ordering::SeqCst),
            update: self.updates.load(Ordering::SeqCst),
            save_draft: self.draft_saves.load(Ordering::SeqCst),
        }
    }

    async fn begin(&self, counter: &AtomicUsize) -> Result<(), PersistenceError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self.scripted_failures.lock().pop_front();
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn insert_new(&self, draft: &CampaignDraft, status: CampaignStatus) -> Uuid {
        let id = Uuid::new_v4();
        let mut record = draft.to_record(status);
        record.id = Some(id);
        let now = Utc::now();
        self.campaigns.insert(
            id,
            StoredCampaign {
                record,
                created_at: now,
                updated_at: now,
                revision: 1,
            },
        );
        id
    }

    fn overwrite(
        &self,
        id: Uuid,
        draft: &CampaignDraft,
        status: Option<CampaignStatus>,
    ) -> Result<(), PersistenceError> {
        let mut entry = self.campaigns.get_mut(&id).ok_or(PersistenceError::NotFound(id))?;
        let status = status.unwrap_or_else(|| entry.record.status.clone());
        let mut record = draft.to_record(status);
        record.id = Some(id);
        entry.record = record;
        entry.updated_at = Utc::now();
        entry.revision += 1;
        Ok(())
    }
}

#[async_trait]
impl DraftPersistenceAdapter for InMemoryCampaignStore {
    async fn create_campaign(&self, draft: &CampaignDraft) -> Result<PersistedCampaign, PersistenceError> {
        self.begin(&self.creates).await?;
        let id = self.insert_new(draft, CampaignStatus::Active);
        info!(campaign_id = %id, "Campaign created");
        Ok(PersistedCampaign { id })
    }

    async fn update_campaign(
        &self,
        id: Uuid,
        draft: &CampaignDraft,
        status: CampaignStatus,
    ) -> Result<PersistedCampaign, PersistenceError> {
        self.begin(&self.updates).await?;
        self.overwrite(id, draft, Some(status.clone()))?;
        info!(campaign_id = %id, status = %status, "Campaign updated");
        Ok(PersistedCampaign { id })
    }

    async fn save_draft(
        &self,
        draft: &CampaignDraft,
        id: Option<Uuid>,
    ) -> Result<PersistedCampaign, PersistenceError> {
        self.begin(&self.draft_saves).await?;
        let id = match id {
            // Saving over a published campaign does not demote it.
            Some(id) => {
                self.overwrite(id, draft, None)?;
                id
            }
            None => self.insert_new(draft, CampaignStatus::Draft),
        };
        debug!(campaign_id = %id, "Draft saved");
        Ok(PersistedCampaign { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> CampaignDraft {
        CampaignDraft {
            title: title.to_string(),
            ..CampaignDraft::new()
        }
    }

    #[tokio::test]
    async fn test_save_draft_creates_then_overwrites() {
        let store = InMemoryCampaignStore::new();
        let first = store.save_draft(&draft("One"), None).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.record(first.id).unwrap().status, CampaignStatus::Draft);

        let second = store.save_draft(&draft("Two"), Some(first.id)).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(store.len(), 1);

        let stored = store.get(first.id).unwrap();
        assert_eq!(stored.record.title, "Two");
        assert_eq!(stored.record.id, Some(first.id));
        assert_eq!(stored.revision, 2);
    }

    #[tokio::test]
    async fn test_create_is_active_and_update_sets_status() {
        let store = InMemoryCampaignStore::new();
        let created = store.create_campaign(&draft("Launch")).await.unwrap();
        assert_eq!(store.record(created.id).unwrap().status, CampaignStatus::Active);

        store
            .update_campaign(created.id, &draft("Launch"), CampaignStatus::Draft)
            .await
            .unwrap();
        assert_eq!(store.record(created.id).unwrap().status, CampaignStatus::Draft);
    }

    #[tokio::test]
    async fn test_save_draft_keeps_existing_status() {
        let store = InMemoryCampaignStore::new();
        let id = store.seed(CampaignRecord {
            title: "Live".to_string(),
            status: CampaignStatus::Active,
            ..CampaignRecord::default()
        });
        store.save_draft(&draft("Live, edited"), Some(id)).await.unwrap();
        let record = store.record(id).unwrap();
        assert_eq!(record.status, CampaignStatus::Active);
        assert_eq!(record.title, "Live, edited");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = InMemoryCampaignStore::new();
        let id = Uuid::new_v4();
        let err = store.save_draft(&draft("x"), Some(id)).await.unwrap_err();
        assert_eq!(err, PersistenceError::NotFound(id));
        let err = store
            .update_campaign(id, &draft("x"), CampaignStatus::Active)
            .await
            .unwrap_err();
        assert_eq!(err, PersistenceError::NotFound(id));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_scripted_failures_are_consumed_in_order() {
        let store = InMemoryCampaignStore::new();
        store.fail_next(PersistenceError::Unavailable("down".into()));
        store.fail_next(PersistenceError::Rejected("bad".into()));

        assert!(matches!(
            store.save_draft(&draft("a"), None).await,
            Err(PersistenceError::Unavailable(_))
        ));
        assert!(matches!(
            store.create_campaign(&draft("a")).await,
            Err(PersistenceError::Rejected(_))
        ));
        assert!(store.save_draft(&draft("a"), None).await.is_ok());

        let calls = store.calls();
        assert_eq!(calls.save_draft, 2);
        assert_eq!(calls.create, 1);
        assert_eq!(calls.total(), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_seed_assigns_missing_id() {
        let store = InMemoryCampaignStore::new();
        let id = store.seed(CampaignRecord::default());
        assert_eq!(store.record(id).unwrap().id, Some(id));
    }
}
