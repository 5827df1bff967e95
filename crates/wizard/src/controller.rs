//! Wizard controller: owns the draft being authored and drives step
//! navigation, validation and persistence.
//!
//! Navigation state and the draft sit behind a short synchronous lock
//! that is never held across an await. Persistence calls are serialized
//! by a separate async lock so that identity binding happens once: a
//! second save waits for the first and then reuses the bound id.

use campaign_core::commands::DraftCommand;
use campaign_core::config::WizardConfig;
use campaign_core::draft::{CampaignDraft, CampaignStatus};
use campaign_core::error::{CampaignError, CampaignResult, PersistenceError};
use campaign_core::field::FieldKey;
use campaign_core::record::CampaignRecord;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{noop_observer, ValidationScope, WizardEvent, WizardObserver};
use crate::persistence::{DraftPersistenceAdapter, PersistedCampaign};
use crate::resolver::required_fields;
use crate::state::{WizardAction, WizardState, WizardStep};
use crate::validator::{StepValidation, StepValidator};

/// Result of a guarded forward move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved(WizardStep),
    /// Validation failed; the step did not change.
    Blocked(StepValidation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(PersistedCampaign),
    /// Aggregate validation failed; nothing was persisted.
    Blocked(StepValidation),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseOutcome {
    /// Id of the draft saved on the way out, if a save happened and succeeded.
    pub saved: Option<Uuid>,
    /// Set when the closing save failed or timed out. Never blocks closing.
    pub warning: Option<String>,
}

pub type PublishCallback = Box<dyn Fn(Uuid) + Send + Sync>;

struct Session {
    state: WizardState,
    draft: CampaignDraft,
    /// Bumped on every applied command.
    revision: u64,
    /// Highest revision known to be persisted.
    saved_revision: u64,
    /// Set once `close` has started; no publish or second close may begin.
    closing: bool,
}

impl Session {
    fn editing(&self, action: WizardAction) -> CampaignResult<WizardState> {
        if self.closing && matches!(action, WizardAction::Publish | WizardAction::Close) {
            return Err(CampaignError::InvalidTransition {
                state: format!("{} (closing)", self.state),
                action: action.name(),
            });
        }
        self.state.on(action)
    }

    fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Bind `returned` as the draft identity, or report a conflict with an
    /// id bound earlier. The bound id is never replaced.
    fn bind_identity(&mut self, returned: Uuid) -> CampaignResult<()> {
        match self.draft.identity {
            Some(bound) if bound != returned => Err(CampaignError::IdentityConflict { bound, returned }),
            Some(_) => Ok(()),
            None => {
                self.draft.identity = Some(returned);
                Ok(())
            }
        }
    }
}

pub struct WizardController {
    adapter: Arc<dyn DraftPersistenceAdapter>,
    validator: StepValidator,
    observer: Arc<dyn WizardObserver>,
    on_published: Option<PublishCallback>,
    config: WizardConfig,
    session: Mutex<Session>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl WizardController {
    /// Start authoring a new campaign.
    pub fn new(adapter: Arc<dyn DraftPersistenceAdapter>, validator: StepValidator) -> Self {
        Self::with_draft(adapter, validator, CampaignDraft::new())
    }

    /// Start editing a stored campaign. The record is normalized first.
    pub fn edit(
        adapter: Arc<dyn DraftPersistenceAdapter>,
        validator: StepValidator,
        record: CampaignRecord,
    ) -> Self {
        let draft = CampaignDraft::from_record(record);
        info!(campaign_id = ?draft.identity, "Editing stored campaign");
        Self::with_draft(adapter, validator, draft)
    }

    pub fn with_draft(
        adapter: Arc<dyn DraftPersistenceAdapter>,
        validator: StepValidator,
        draft: CampaignDraft,
    ) -> Self {
        Self {
            adapter,
            validator,
            observer: noop_observer(),
            on_published: None,
            config: WizardConfig::default(),
            session: Mutex::new(Session {
                state: WizardState::default(),
                draft,
                revision: 0,
                saved_revision: 0,
                closing: false,
            }),
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn WizardObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_config(mut self, config: WizardConfig) -> Self {
        self.config = config;
        self
    }

    /// Called once with the campaign id after a successful publish.
    pub fn on_published(mut self, callback: impl Fn(Uuid) + Send + Sync + 'static) -> Self {
        self.on_published = Some(Box::new(callback));
        self
    }

    // ─── Snapshots ─────────────────────────────────────────────────────────

    pub fn state(&self) -> WizardState {
        self.session.lock().state
    }

    pub fn current_step(&self) -> Option<WizardStep> {
        self.session.lock().state.step()
    }

    pub fn draft(&self) -> CampaignDraft {
        self.session.lock().draft.clone()
    }

    pub fn identity(&self) -> Option<Uuid> {
        self.session.lock().draft.identity
    }

    /// True when the draft has edits that have not been persisted.
    pub fn is_dirty(&self) -> bool {
        self.session.lock().is_dirty()
    }

    /// Fields the current draft must fill before it can be published.
    pub fn required_fields(&self) -> BTreeSet<FieldKey> {
        required_fields(&self.session.lock().draft)
    }

    /// Validation of `step` against the current draft, without moving.
    pub fn validation(&self, step: WizardStep) -> StepValidation {
        self.validator.validate(step, &self.session.lock().draft)
    }

    // ─── Editing ───────────────────────────────────────────────────────────

    /// Apply one field update. Only allowed while editing.
    pub fn apply(&self, command: DraftCommand) -> CampaignResult<()> {
        self.apply_all([command])
    }

    /// Apply a batch of updates atomically: either all of them land or
    /// the draft is left unchanged.
    pub fn apply_all(&self, commands: impl IntoIterator<Item = DraftCommand>) -> CampaignResult<()> {
        let mut session = self.session.lock();
        session.editing(WizardAction::Edit)?;
        let updated = session.draft.apply_all(commands)?;
        if updated != session.draft {
            session.draft = updated;
            session.revision += 1;
        }
        Ok(())
    }

    // ─── Navigation ────────────────────────────────────────────────────────

    /// Advance one step if the current step validates.
    pub fn next(&self) -> CampaignResult<Navigation> {
        let (current, validation) = {
            let mut session = self.session.lock();
            let target = session.editing(WizardAction::Next)?;
            let current = session.state.step();
            let validation = match current {
                Some(step) => self.validator.validate(step, &session.draft),
                None => StepValidation::valid(),
            };
            if validation.is_valid {
                session.state = target;
                return Ok(Navigation::Moved(target.step().unwrap_or(WizardStep::Step1)));
            }
            (current, validation)
        };

        if let Some(step) = current {
            self.report_blocked(ValidationScope::Step(step), &validation);
        }
        Ok(Navigation::Blocked(validation))
    }

    /// Go back one step. Never validates.
    pub fn back(&self) -> CampaignResult<WizardStep> {
        let mut session = self.session.lock();
        session.state = session.editing(WizardAction::Back)?;
        debug!(step = %session.state, "Moved back");
        Ok(session.state.step().unwrap_or(WizardStep::Step1))
    }

    /// Jump to `target`. Moving forward validates every step being skipped
    /// and reports their errors as one batch; moving backward never
    /// validates.
    pub fn jump_to(&self, target: WizardStep) -> CampaignResult<Navigation> {
        let (scope, validation) = {
            let mut session = self.session.lock();
            let moved = session.editing(WizardAction::JumpTo(target))?;
            let current = session.state.step().unwrap_or(WizardStep::Step1);
            let skipped: Vec<WizardStep> = WizardStep::ALL
                .into_iter()
                .filter(|step| *step >= current && *step < target)
                .collect();
            let results: Vec<(WizardStep, StepValidation)> = skipped
                .into_iter()
                .map(|step| (step, self.validator.validate(step, &session.draft)))
                .collect();
            let first_failed = results.iter().find(|(_, v)| !v.is_valid).map(|(step, _)| *step);
            let validation = StepValidation::merge(results.into_iter().map(|(_, v)| v));

            match first_failed {
                None => {
                    session.state = moved;
                    return Ok(Navigation::Moved(target));
                }
                Some(step) => (ValidationScope::Step(step), validation),
            }
        };

        self.report_blocked(scope, &validation);
        Ok(Navigation::Blocked(validation))
    }

    // ─── Persistence ───────────────────────────────────────────────────────

    /// Persist the full draft without validating it. The first success
    /// binds the draft identity; later saves reuse it.
    pub async fn save_draft(&self) -> CampaignResult<PersistedCampaign> {
        self.session.lock().editing(WizardAction::SaveDraft)?;
        let _persist = self.persist_lock.lock().await;

        // Re-read after waiting: an earlier save may have bound the identity.
        let (draft, revision) = {
            let session = self.session.lock();
            session.editing(WizardAction::SaveDraft)?;
            (session.draft.clone(), session.revision)
        };
        if draft.has_pending_upload() {
            warn!("Saving draft while the image upload is still pending; image is omitted");
        }

        let result = self.adapter.save_draft(&draft, draft.identity).await;
        let persisted = match result {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(error = %err, campaign_id = ?draft.identity, "Draft save failed");
                self.observer.notify(WizardEvent::DraftSaveFailed {
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };

        let bound = {
            let mut session = self.session.lock();
            let bound = session.bind_identity(persisted.id);
            if bound.is_ok() {
                session.saved_revision = session.saved_revision.max(revision);
            }
            bound
        };
        if let Err(err) = bound {
            warn!(error = %err, "Draft save returned a different campaign id");
            self.observer.notify(WizardEvent::DraftSaveFailed {
                message: err.to_string(),
            });
            return Err(err);
        }

        metrics::counter!("wizard.drafts.saved").increment(1);
        info!(campaign_id = %persisted.id, revision, "Draft saved");
        self.observer.notify(WizardEvent::DraftSaved { id: persisted.id });
        Ok(persisted)
    }

    /// Close the wizard. Unsaved edits get one best-effort draft save,
    /// bounded by the configured timeout; its failure is reported in the
    /// outcome and never prevents closing. Close is refused while a
    /// publish is in flight, and a publish cannot start once close has.
    pub async fn close(&self) -> CampaignResult<CloseOutcome> {
        let dirty = {
            let mut session = self.session.lock();
            session.editing(WizardAction::Close)?;
            session.closing = true;
            session.is_dirty()
        };

        let mut outcome = CloseOutcome::default();
        if dirty {
            let limit_ms = self.config.close_save_timeout_ms;
            match tokio::time::timeout(Duration::from_millis(limit_ms), self.save_draft()).await {
                Ok(Ok(persisted)) => outcome.saved = Some(persisted.id),
                Ok(Err(err)) => outcome.warning = Some(format!("Draft was not saved: {}", err)),
                Err(_) => {
                    outcome.warning = Some(format!("Draft was not saved: {}", PersistenceError::Timeout(limit_ms)))
                }
            }
        }

        {
            let mut session = self.session.lock();
            session.state = session.state.on(WizardAction::Close)?;
        }

        match &outcome.warning {
            Some(warning) => warn!(warning = %warning, "Wizard closed with unsaved changes"),
            None => info!(saved = ?outcome.saved, "Wizard closed"),
        }
        self.observer.notify(WizardEvent::Closed {
            warning: outcome.warning.clone(),
        });
        Ok(outcome)
    }

    /// Validate every step and, if all pass, store the campaign as active.
    /// A campaign that was never saved is created; otherwise its bound
    /// record is updated.
    pub async fn publish(&self) -> CampaignResult<PublishOutcome> {
        let prepared = {
            let mut session = self.session.lock();
            let saving = session.editing(WizardAction::Publish)?;
            let validation = self.validator.validate_all(&session.draft);
            if validation.is_valid {
                session.state = saving;
                Ok(())
            } else {
                Err(validation)
            }
        };
        if let Err(validation) = prepared {
            self.report_blocked(ValidationScope::All, &validation);
            return Ok(PublishOutcome::Blocked(validation));
        }

        let _persist = self.persist_lock.lock().await;
        let (draft, revision) = {
            let session = self.session.lock();
            (session.draft.clone(), session.revision)
        };
        if draft.has_pending_upload() {
            warn!("Publishing while the image upload is still pending; image is omitted");
        }

        let result = match draft.identity {
            None => self.adapter.create_campaign(&draft).await,
            Some(id) => self.adapter.update_campaign(id, &draft, CampaignStatus::Active).await,
        };

        let finished = result.map_err(CampaignError::from).and_then(|persisted| {
            let mut session = self.session.lock();
            session.bind_identity(persisted.id)?;
            session.saved_revision = session.saved_revision.max(revision);
            session.state = session.state.on(WizardAction::PublishSucceeded)?;
            Ok(persisted)
        });

        match finished {
            Ok(persisted) => {
                metrics::counter!("wizard.published").increment(1);
                info!(campaign_id = %persisted.id, "Campaign published");
                self.observer.notify(WizardEvent::Published { id: persisted.id });
                if let Some(callback) = &self.on_published {
                    callback(persisted.id);
                }
                Ok(PublishOutcome::Published(persisted))
            }
            Err(err) => {
                {
                    let mut session = self.session.lock();
                    session.state = session.state.on(WizardAction::PublishFailed)?;
                }
                metrics::counter!("wizard.publish.failed").increment(1);
                warn!(error = %err, campaign_id = ?draft.identity, "Publish failed");
                self.observer.notify(WizardEvent::PublishFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn report_blocked(&self, scope: ValidationScope, validation: &StepValidation) {
        metrics::counter!("wizard.validation.failed").increment(1);
        debug!(scope = ?scope, errors = validation.errors.len(), "Validation blocked transition");
        self.observer.notify(WizardEvent::ValidationFailed {
            scope,
            errors: validation.errors.clone(),
        });
    }
}
