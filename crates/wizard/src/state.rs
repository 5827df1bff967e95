use campaign_core::error::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four sequential sections of the authoring flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    Step1,
    Step2,
    Step3,
    Step4,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Step1,
        WizardStep::Step2,
        WizardStep::Step3,
        WizardStep::Step4,
    ];

    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Step1 => 1,
            WizardStep::Step2 => 2,
            WizardStep::Step3 => 3,
            WizardStep::Step4 => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Step1 => "Campaign Details",
            WizardStep::Step2 => "Content Requirements",
            WizardStep::Step3 => "Budget & Timeline",
            WizardStep::Step4 => "Creators & Audience",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step{}", self.number())
    }
}

/// Lifecycle of one authoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardState {
    Editing(WizardStep),
    /// A publish call is in flight.
    Saving,
    Published,
    Closed,
}

impl Default for WizardState {
    fn default() -> Self {
        WizardState::Editing(WizardStep::Step1)
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardState::Editing(step) => write!(f, "{}", step),
            WizardState::Saving => f.write_str("Saving"),
            WizardState::Published => f.write_str("Published"),
            WizardState::Closed => f.write_str("Closed"),
        }
    }
}

/// Structural moves of the state machine. Guards such as step validation
/// are evaluated by the controller before a move is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardAction {
    /// Editing(n) -> Editing(n+1)
    Next,
    /// Editing(n) -> Editing(n-1)
    Back,
    /// Editing(any) -> Editing(target)
    JumpTo(WizardStep),
    /// Editing(any) -> Editing(same)
    Edit,
    /// Editing(any) -> Editing(same)
    SaveDraft,
    /// Editing(Step4) -> Saving
    Publish,
    /// Saving -> Published
    PublishSucceeded,
    /// Saving -> Editing(Step4)
    PublishFailed,
    /// Editing(any) -> Closed
    Close,
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::Next => "advance",
            WizardAction::Back => "go back",
            WizardAction::JumpTo(_) => "jump",
            WizardAction::Edit => "edit",
            WizardAction::SaveDraft => "save draft",
            WizardAction::Publish => "publish",
            WizardAction::PublishSucceeded => "complete publish",
            WizardAction::PublishFailed => "fail publish",
            WizardAction::Close => "close",
        }
    }
}

impl WizardState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardState::Published | WizardState::Closed)
    }

    pub fn step(&self) -> Option<WizardStep> {
        match self {
            WizardState::Editing(step) => Some(*step),
            _ => None,
        }
    }

    /// Target state of `action`, or an error when the move is not allowed
    /// from `self`.
    pub fn on(self, action: WizardAction) -> CampaignResult<WizardState> {
        let target = match (self, action) {
            (WizardState::Editing(step), WizardAction::Next) => step.next().map(WizardState::Editing),
            (WizardState::Editing(step), WizardAction::Back) => step.previous().map(WizardState::Editing),
            (WizardState::Editing(_), WizardAction::JumpTo(target)) => Some(WizardState::Editing(target)),
            (WizardState::Editing(step), WizardAction::Edit)
            | (WizardState::Editing(step), WizardAction::SaveDraft) => Some(WizardState::Editing(step)),
            (WizardState::Editing(WizardStep::Step4), WizardAction::Publish) => Some(WizardState::Saving),
            (WizardState::Saving, WizardAction::Publish) => return Err(CampaignError::PublishInFlight),
            (WizardState::Saving, WizardAction::PublishSucceeded) => Some(WizardState::Published),
            (WizardState::Saving, WizardAction::PublishFailed) => Some(WizardState::Editing(WizardStep::Step4)),
            (WizardState::Editing(_), WizardAction::Close) => Some(WizardState::Closed),
            _ => None,
        };
        target.ok_or_else(|| CampaignError::InvalidTransition {
            state: self.to_string(),
            action: action.name(),
        })
    }
}
