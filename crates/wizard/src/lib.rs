//! Campaign authoring wizard: conditional field resolution, per-step
//! validation, the persistence boundary and the controller that drives a
//! four-step authoring session.

pub mod controller;
pub mod events;
pub mod persistence;
pub mod resolver;
pub mod state;
pub mod store;
pub mod validator;

pub use controller::{CloseOutcome, Navigation, PublishOutcome, WizardController};
pub use events::{CaptureObserver, NoOpObserver, ValidationScope, WizardEvent, WizardObserver};
pub use persistence::{DraftPersistenceAdapter, PersistedCampaign};
pub use resolver::{active_fields, required_fields, Presence};
pub use state::{WizardAction, WizardState, WizardStep};
pub use store::InMemoryCampaignStore;
pub use validator::{StepValidation, StepValidator};
