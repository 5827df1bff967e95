//! Step validation rules: four independently callable per-step checks and
//! the aggregate used before publishing.
//!
//! Every check returns the complete batch of findings for its step.
//! Errors block the step; warnings are advisory and never affect
//! `is_valid`.

use campaign_core::config::ValidationConfig;
use campaign_core::draft::{parse_amount, parse_count, BudgetType, CampaignDraft, Deliverable, SocialChannel};
use campaign_core::field::{AudienceField, ContentItemField, FieldError, FieldKey};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

use crate::resolver::required_fields;
use crate::state::WizardStep;

/// Outcome of validating one step (or all of them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepValidation {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldError>,
}

impl StepValidation {
    /// The result for a step with nothing to check.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn from_findings(errors: Vec<FieldError>, warnings: Vec<FieldError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub(crate) fn merge(parts: impl IntoIterator<Item = StepValidation>) -> Self {
        let (mut errors, mut warnings) = (Vec::new(), Vec::new());
        for part in parts {
            errors.extend(part.errors);
            warnings.extend(part.warnings);
        }
        Self::from_findings(errors, warnings)
    }

    pub fn has_error_for(&self, field: FieldKey) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn error_fields(&self) -> Vec<FieldKey> {
        self.errors.iter().map(|e| e.field).collect()
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn quoted(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("\"{}\"", label))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validation rules for the four wizard steps.
#[derive(Debug, Clone, Default)]
pub struct StepValidator {
    config: ValidationConfig,
    today: Option<NaiveDate>,
}

impl StepValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config, today: None }
    }

    /// Pin the date used by the "start date not in the past" rule.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Title, description and campaign goal.
    pub fn validate_step1(&self, draft: &CampaignDraft) -> StepValidation {
        let required = required_fields(draft);
        let mut errors = Vec::new();

        if required.contains(&FieldKey::Title) && blank(&draft.title) {
            errors.push(FieldError::new(FieldKey::Title, "Campaign title is required"));
        }

        if required.contains(&FieldKey::Description) {
            let description = draft.description.trim();
            if description.is_empty() {
                errors.push(FieldError::new(FieldKey::Description, "Campaign description is required"));
            } else if description.chars().count() < self.config.min_description_chars {
                errors.push(FieldError::new(
                    FieldKey::Description,
                    format!(
                        "Description must be at least {} characters",
                        self.config.min_description_chars
                    ),
                ));
            }
        }

        if required.contains(&FieldKey::CampaignGoal) && draft.campaign_goal.is_empty() {
            let message = if draft.unlisted_goals.is_empty() {
                "Select at least one campaign goal".to_string()
            } else {
                format!(
                    "{} is no longer offered, select at least one campaign goal",
                    quoted(&draft.unlisted_goals)
                )
            };
            errors.push(FieldError::new(FieldKey::CampaignGoal, message));
        }

        StepValidation::from_findings(errors, Vec::new())
    }

    /// Content items: channel, then content type or custom title, then quantity.
    pub fn validate_step2(&self, draft: &CampaignDraft) -> StepValidation {
        let required = required_fields(draft);
        let mut errors = Vec::new();

        if required.contains(&FieldKey::ContentItems) && draft.content_items.is_empty() {
            errors.push(FieldError::new(FieldKey::ContentItems, "Add at least one content item"));
        }

        for (index, item) in draft.content_items.iter().enumerate() {
            let key = |field| FieldKey::content_item(index, field);

            if required.contains(&key(ContentItemField::SocialChannel)) && !item.has_channel() {
                errors.push(FieldError::new(
                    key(ContentItemField::SocialChannel),
                    format!("Content item {}: select a social channel", index + 1),
                ));
            }

            match &item.deliverable {
                Deliverable::Custom { custom_title } => {
                    if required.contains(&key(ContentItemField::CustomTitle)) && blank(custom_title) {
                        errors.push(FieldError::new(
                            key(ContentItemField::CustomTitle),
                            format!("Content item {}: enter a title for the custom deliverable", index + 1),
                        ));
                    }
                }
                Deliverable::Standard { content_type, .. } => {
                    if required.contains(&key(ContentItemField::ContentType)) && content_type.is_none() {
                        errors.push(FieldError::new(
                            key(ContentItemField::ContentType),
                            format!("Content item {}: select a content type", index + 1),
                        ));
                    }
                }
                Deliverable::Unlisted { channel, content_type } => {
                    if SocialChannel::from_label(channel).is_none() {
                        if required.contains(&key(ContentItemField::SocialChannel)) {
                            errors.push(FieldError::new(
                                key(ContentItemField::SocialChannel),
                                format!(
                                    "Content item {}: \"{}\" is no longer offered, select a social channel",
                                    index + 1,
                                    channel
                                ),
                            ));
                        }
                    } else if required.contains(&key(ContentItemField::ContentType)) {
                        errors.push(FieldError::new(
                            key(ContentItemField::ContentType),
                            format!(
                                "Content item {}: \"{}\" is no longer offered, select a content type",
                                index + 1,
                                content_type
                            ),
                        ));
                    }
                }
                Deliverable::Unassigned => {
                    if required.contains(&key(ContentItemField::ContentType)) {
                        errors.push(FieldError::new(
                            key(ContentItemField::ContentType),
                            format!("Content item {}: select a content type", index + 1),
                        ));
                    }
                }
            }

            if required.contains(&key(ContentItemField::Quantity)) && item.quantity < 1 {
                errors.push(FieldError::new(
                    key(ContentItemField::Quantity),
                    format!("Content item {}: quantity must be at least 1", index + 1),
                ));
            }
        }

        StepValidation::from_findings(errors, Vec::new())
    }

    /// Budget type, budget, gifted product description and the campaign window.
    pub fn validate_step3(&self, draft: &CampaignDraft) -> StepValidation {
        let required = required_fields(draft);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if required.contains(&FieldKey::BudgetType) && draft.budget_type.is_empty() {
            let message = if draft.unlisted_budget_types.is_empty() {
                "Select at least one budget type".to_string()
            } else {
                format!(
                    "{} is no longer offered, select at least one budget type",
                    quoted(&draft.unlisted_budget_types)
                )
            };
            errors.push(FieldError::new(FieldKey::BudgetType, message));
        }

        if required.contains(&FieldKey::Budget) {
            if blank(&draft.budget) {
                errors.push(FieldError::new(FieldKey::Budget, "Budget is required"));
            } else if draft.has_budget_type(BudgetType::Paid) {
                match parse_amount(&draft.budget) {
                    Some(amount) if amount > 0.0 => {}
                    _ => errors.push(FieldError::new(
                        FieldKey::Budget,
                        "Budget must be a number greater than 0",
                    )),
                }
            }
        }

        if required.contains(&FieldKey::ProductServiceDescription) && blank(&draft.product_service_description) {
            errors.push(FieldError::new(
                FieldKey::ProductServiceDescription,
                "Describe the product or service being gifted",
            ));
        }

        self.check_dates(draft, &required, &mut errors, &mut warnings);

        StepValidation::from_findings(errors, warnings)
    }

    fn check_dates(
        &self,
        draft: &CampaignDraft,
        required: &BTreeSet<FieldKey>,
        errors: &mut Vec<FieldError>,
        warnings: &mut Vec<FieldError>,
    ) {
        let today = self.today();

        match draft.start_date {
            None if required.contains(&FieldKey::StartDate) => {
                errors.push(FieldError::new(FieldKey::StartDate, "Start date is required"));
            }
            Some(start) if start < today => {
                errors.push(FieldError::new(FieldKey::StartDate, "Start date cannot be in the past"));
            }
            _ => {}
        }

        match (draft.start_date, draft.completion_date) {
            (_, None) if required.contains(&FieldKey::CompletionDate) => {
                errors.push(FieldError::new(FieldKey::CompletionDate, "Completion date is required"));
            }
            (Some(start), Some(completion)) if completion <= start => {
                errors.push(FieldError::new(
                    FieldKey::CompletionDate,
                    "Completion date must be after the start date",
                ));
            }
            (Some(start), Some(completion)) => {
                let days = (completion - start).num_days();
                if days < self.config.recommended_min_campaign_days {
                    warnings.push(FieldError::new(
                        FieldKey::CompletionDate,
                        format!(
                            "Campaign runs {} day(s); at least {} days is recommended",
                            days, self.config.recommended_min_campaign_days
                        ),
                    ));
                }
            }
            _ => {}
        }
    }

    /// Creator count and, for distribution campaigns, the target audience.
    pub fn validate_step4(&self, draft: &CampaignDraft) -> StepValidation {
        let required = required_fields(draft);
        let mut errors = Vec::new();

        if required.contains(&FieldKey::CreatorCount) {
            if blank(&draft.creator_count) {
                errors.push(FieldError::new(FieldKey::CreatorCount, "Number of creators is required"));
            } else if !matches!(parse_count(&draft.creator_count), Some(count) if count >= 1) {
                errors.push(FieldError::new(
                    FieldKey::CreatorCount,
                    "Number of creators must be a whole number of at least 1",
                ));
            }
        }

        let audience = &draft.target_audience;
        let channel_key = FieldKey::TargetAudience(AudienceField::SocialChannel);
        if required.contains(&channel_key) && audience.social_channel.is_none() {
            let message = match &audience.unlisted_social_channel {
                Some(label) => format!(
                    "\"{}\" is no longer offered, select the social channel to distribute content on",
                    label
                ),
                None => "Select the social channel to distribute content on".to_string(),
            };
            errors.push(FieldError::new(channel_key, message));
        }
        let size_key = FieldKey::TargetAudience(AudienceField::AudienceSize);
        if required.contains(&size_key) && audience.audience_size.is_empty() {
            errors.push(FieldError::new(size_key, "Select at least one audience size"));
        }

        StepValidation::from_findings(errors, Vec::new())
    }

    /// Union of all four steps.
    pub fn validate_all(&self, draft: &CampaignDraft) -> StepValidation {
        StepValidation::merge(WizardStep::ALL.into_iter().map(|step| self.validate(step, draft)))
    }

    pub fn validate(&self, step: WizardStep, draft: &CampaignDraft) -> StepValidation {
        match step {
            WizardStep::Step1 => self.validate_step1(draft),
            WizardStep::Step2 => self.validate_step2(draft),
            WizardStep::Step3 => self.validate_step3(draft),
            WizardStep::Step4 => self.validate_step4(draft),
        }
    }

    /// Dispatch by step number. Numbers outside 1..=4 have no rules and
    /// pass.
    pub fn get_step_validation(&self, step: u8, draft: &CampaignDraft) -> StepValidation {
        match WizardStep::from_number(step) {
            Some(step) => self.validate(step, draft),
            None => {
                warn!(step, "No validation rules for step, treating as valid");
                StepValidation::valid()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::draft::{CampaignGoal, ContentItem, ContentType, SocialChannel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn validator() -> StepValidator {
        StepValidator::default().with_today(date(2024, 5, 20))
    }

    fn complete_draft() -> CampaignDraft {
        CampaignDraft {
            title: "Summer Launch".to_string(),
            description: "Launch of the summer linen collection".to_string(),
            campaign_goal: BTreeSet::from([CampaignGoal::ContentCreation]),
            budget: "$1,500".to_string(),
            creator_count: "5".to_string(),
            start_date: Some(date(2024, 6, 1)),
            completion_date: Some(date(2024, 6, 30)),
            content_items: vec![ContentItem::standard(SocialChannel::Instagram, ContentType::Reel, 2)],
            ..CampaignDraft::new()
        }
    }

    #[test]
    fn test_complete_draft_is_valid() {
        let result = validator().validate_all(&complete_draft());
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_step1_empty_fields_report_three_errors() {
        let draft = CampaignDraft {
            title: String::new(),
            description: String::new(),
            campaign_goal: BTreeSet::new(),
            ..complete_draft()
        };
        let result = validator().validate_step1(&draft);
        assert!(!result.is_valid);
        assert_eq!(
            result.error_fields(),
            vec![FieldKey::Title, FieldKey::Description, FieldKey::CampaignGoal]
        );
    }

    #[test]
    fn test_step1_short_description() {
        let draft = CampaignDraft {
            description: "Too short".to_string(),
            ..complete_draft()
        };
        let result = validator().validate_step1(&draft);
        assert_eq!(result.error_fields(), vec![FieldKey::Description]);
        assert!(result.errors[0].message.contains("10"));

        let draft = CampaignDraft {
            description: "Ten chars!".to_string(),
            ..complete_draft()
        };
        assert!(validator().validate_step1(&draft).is_valid);
    }

    #[test]
    fn test_step2_requires_content_items() {
        let draft = CampaignDraft {
            content_items: Vec::new(),
            ..complete_draft()
        };
        let result = validator().validate_step2(&draft);
        assert!(!result.is_valid);
        assert!(result.has_error_for(FieldKey::ContentItems));
    }

    #[test]
    fn test_step2_other_channel_requires_only_custom_title() {
        let draft = CampaignDraft {
            content_items: vec![ContentItem::custom("", 1)],
            ..complete_draft()
        };
        let result = validator().validate_step2(&draft);
        assert_eq!(
            result.error_fields(),
            vec![FieldKey::content_item(0, ContentItemField::CustomTitle)]
        );
    }

    #[test]
    fn test_step2_errors_are_tagged_by_index() {
        let mut missing_type = ContentItem::standard(SocialChannel::TikTok, ContentType::Video, 0);
        missing_type.deliverable = Deliverable::Standard {
            channel: SocialChannel::TikTok,
            content_type: None,
        };
        let draft = CampaignDraft {
            content_items: vec![
                ContentItem::standard(SocialChannel::Instagram, ContentType::Post, 1),
                missing_type,
                ContentItem::new(),
            ],
            ..complete_draft()
        };
        let result = validator().validate_step2(&draft);
        assert_eq!(
            result.error_fields(),
            vec![
                FieldKey::content_item(1, ContentItemField::ContentType),
                FieldKey::content_item(1, ContentItemField::Quantity),
                FieldKey::content_item(2, ContentItemField::SocialChannel),
                FieldKey::content_item(2, ContentItemField::ContentType),
            ]
        );
    }

    #[test]
    fn test_unlisted_labels_are_flagged() {
        let mut draft = CampaignDraft {
            campaign_goal: BTreeSet::new(),
            unlisted_goals: vec!["Brand Awareness".to_string()],
            content_items: vec![
                ContentItem {
                    deliverable: Deliverable::Unlisted {
                        channel: "Threads".to_string(),
                        content_type: "Post".to_string(),
                    },
                    ..ContentItem::new()
                },
                ContentItem {
                    deliverable: Deliverable::Unlisted {
                        channel: "Instagram".to_string(),
                        content_type: "Podcast".to_string(),
                    },
                    ..ContentItem::new()
                },
            ],
            ..complete_draft()
        };
        draft.target_audience.unlisted_social_channel = Some("Threads".to_string());

        let step1 = validator().validate_step1(&draft);
        assert_eq!(step1.error_fields(), vec![FieldKey::CampaignGoal]);
        assert!(step1.errors[0].message.contains("\"Brand Awareness\""));

        let step2 = validator().validate_step2(&draft);
        assert_eq!(
            step2.error_fields(),
            vec![
                FieldKey::content_item(0, ContentItemField::SocialChannel),
                FieldKey::content_item(1, ContentItemField::ContentType),
            ]
        );
        assert!(step2.errors[0].message.contains("\"Threads\""));
        assert!(step2.errors[1].message.contains("\"Podcast\""));

        // The audience channel is only checked for distribution campaigns.
        assert!(validator().validate_step4(&draft).is_valid);
        draft.campaign_goal.insert(CampaignGoal::ContentDistribution);
        draft.target_audience.audience_size.insert("10K-50K".to_string());
        let step4 = validator().validate_step4(&draft);
        assert_eq!(
            step4.error_fields(),
            vec![FieldKey::TargetAudience(AudienceField::SocialChannel)]
        );
        assert!(step4.errors[0].message.contains("\"Threads\""));
    }

    #[test]
    fn test_step3_gifted_requires_product_description() {
        let draft = CampaignDraft {
            budget_type: BTreeSet::from([BudgetType::Gifted]),
            product_service_description: String::new(),
            ..complete_draft()
        };
        let result = validator().validate_step3(&draft);
        assert!(!result.is_valid);
        assert_eq!(result.error_fields(), vec![FieldKey::ProductServiceDescription]);
    }

    #[test]
    fn test_step3_paid_budget_must_be_positive() {
        for budget in ["$0", "free", "0.00"] {
            let draft = CampaignDraft {
                budget_type: BTreeSet::from([BudgetType::Paid]),
                budget: budget.to_string(),
                ..complete_draft()
            };
            let result = validator().validate_step3(&draft);
            assert!(!result.is_valid, "budget {:?} should be rejected", budget);
            assert!(result.has_error_for(FieldKey::Budget));
        }
    }

    #[test]
    fn test_step3_non_paid_budget_is_free_text() {
        let draft = CampaignDraft {
            budget_type: BTreeSet::from([BudgetType::Affiliate]),
            budget: "15% commission".to_string(),
            ..complete_draft()
        };
        assert!(validator().validate_step3(&draft).is_valid);
    }

    #[test]
    fn test_step3_empty_budget_type_is_reported() {
        let draft = CampaignDraft {
            budget_type: BTreeSet::new(),
            ..complete_draft()
        };
        assert!(validator().validate_step3(&draft).has_error_for(FieldKey::BudgetType));
    }

    #[test]
    fn test_step3_date_rules() {
        let missing = CampaignDraft {
            start_date: None,
            completion_date: None,
            ..complete_draft()
        };
        assert_eq!(
            validator().validate_step3(&missing).error_fields(),
            vec![FieldKey::StartDate, FieldKey::CompletionDate]
        );

        let past = CampaignDraft {
            start_date: Some(date(2024, 5, 19)),
            ..complete_draft()
        };
        assert_eq!(validator().validate_step3(&past).error_fields(), vec![FieldKey::StartDate]);

        let same_day = CampaignDraft {
            start_date: Some(date(2024, 6, 1)),
            completion_date: Some(date(2024, 6, 1)),
            ..complete_draft()
        };
        assert_eq!(
            validator().validate_step3(&same_day).error_fields(),
            vec![FieldKey::CompletionDate]
        );

        let starts_today = CampaignDraft {
            start_date: Some(date(2024, 5, 20)),
            completion_date: Some(date(2024, 6, 20)),
            ..complete_draft()
        };
        assert!(validator().validate_step3(&starts_today).is_valid);
    }

    #[test]
    fn test_step3_short_campaign_only_warns() {
        let draft = CampaignDraft {
            start_date: Some(date(2024, 6, 1)),
            completion_date: Some(date(2024, 6, 5)),
            ..complete_draft()
        };
        let result = validator().validate_step3(&draft);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, FieldKey::CompletionDate);
    }

    #[test]
    fn test_step4_creator_count() {
        let zero = CampaignDraft {
            creator_count: "0".to_string(),
            ..complete_draft()
        };
        assert!(!validator().validate_step4(&zero).is_valid);

        let text = CampaignDraft {
            creator_count: "a few".to_string(),
            ..complete_draft()
        };
        assert!(!validator().validate_step4(&text).is_valid);

        let five = CampaignDraft {
            creator_count: "5".to_string(),
            ..complete_draft()
        };
        let result = validator().validate_step4(&five);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_step4_distribution_requires_audience() {
        let draft = CampaignDraft {
            campaign_goal: BTreeSet::from([CampaignGoal::ContentDistribution]),
            ..complete_draft()
        };
        let result = validator().validate_step4(&draft);
        assert_eq!(
            result.error_fields(),
            vec![
                FieldKey::TargetAudience(AudienceField::SocialChannel),
                FieldKey::TargetAudience(AudienceField::AudienceSize),
            ]
        );

        let mut draft = draft;
        draft.target_audience.social_channel = Some(SocialChannel::YouTube);
        draft.target_audience.audience_size.insert("10K-50K".to_string());
        assert!(validator().validate_step4(&draft).is_valid);
    }

    #[test]
    fn test_validate_all_is_union_of_steps() {
        let draft = CampaignDraft::new();
        let v = validator();
        let all = v.validate_all(&draft);
        let expected: Vec<FieldError> = WizardStep::ALL
            .into_iter()
            .flat_map(|step| v.validate(step, &draft).errors)
            .collect();
        assert!(!all.is_valid);
        assert_eq!(all.errors, expected);
    }

    #[test]
    fn test_get_step_validation_dispatch() {
        let draft = CampaignDraft::new();
        let v = validator();
        assert_eq!(v.get_step_validation(1, &draft), v.validate_step1(&draft));
        assert_eq!(v.get_step_validation(2, &draft), v.validate_step2(&draft));
        assert_eq!(v.get_step_validation(3, &draft), v.validate_step3(&draft));
        assert_eq!(v.get_step_validation(4, &draft), v.validate_step4(&draft));
        for step in [0, 5, 42] {
            assert_eq!(v.get_step_validation(step, &draft), StepValidation::valid());
        }
    }
}
