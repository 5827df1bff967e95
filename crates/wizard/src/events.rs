//! Notifications emitted by the wizard controller.
//!
//! The controller holds an `Arc<dyn WizardObserver>`; hosts route events
//! to toasts, analytics or logs. [`CaptureObserver`] records them for
//! tests.

use campaign_core::field::FieldError;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::state::WizardStep;

/// Which validation produced a batch of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationScope {
    Step(WizardStep),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
    /// One batch per blocked transition, never one event per field.
    ValidationFailed {
        scope: ValidationScope,
        errors: Vec<FieldError>,
    },
    DraftSaved {
        id: Uuid,
    },
    DraftSaveFailed {
        message: String,
    },
    Published {
        id: Uuid,
    },
    PublishFailed {
        message: String,
    },
    Closed {
        warning: Option<String>,
    },
}

impl WizardEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WizardEvent::ValidationFailed { .. } => "validation_failed",
            WizardEvent::DraftSaved { .. } => "draft_saved",
            WizardEvent::DraftSaveFailed { .. } => "draft_save_failed",
            WizardEvent::Published { .. } => "published",
            WizardEvent::PublishFailed { .. } => "publish_failed",
            WizardEvent::Closed { .. } => "closed",
        }
    }
}

pub trait WizardObserver: Send + Sync {
    fn notify(&self, event: WizardEvent);
}

/// Observer that drops every event.
pub struct NoOpObserver;

impl WizardObserver for NoOpObserver {
    fn notify(&self, _event: WizardEvent) {}
}

/// Observer that keeps every event in memory.
#[derive(Default)]
pub struct CaptureObserver {
    events: Mutex<Vec<WizardEvent>>,
}

impl CaptureObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WizardEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.lock().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl WizardObserver for CaptureObserver {
    fn notify(&self, event: WizardEvent) {
        self.events.lock().push(event);
    }
}

pub fn noop_observer() -> Arc<dyn WizardObserver> {
    Arc::new(NoOpObserver)
}

pub fn capture_observer() -> Arc<CaptureObserver> {
    Arc::new(CaptureObserver::new())
}
