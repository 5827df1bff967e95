//! Conditional field resolution: which fields are active, and which of
//! those are required, for the current selections of a draft.
//!
//! Validation and presentation both read from here so the two can never
//! disagree about what a given budget type or goal switches on.

use campaign_core::draft::{BudgetType, CampaignDraft, CampaignGoal, Deliverable};
use campaign_core::field::{AudienceField, ContentItemField, FieldKey};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Required,
    Optional,
}

const ALWAYS_REQUIRED: [FieldKey; 9] = [
    FieldKey::Title,
    FieldKey::Description,
    FieldKey::CampaignGoal,
    FieldKey::ContentItems,
    FieldKey::BudgetType,
    FieldKey::Budget,
    FieldKey::StartDate,
    FieldKey::CompletionDate,
    FieldKey::CreatorCount,
];

const ALWAYS_OPTIONAL: [FieldKey; 8] = [
    FieldKey::Image,
    FieldKey::Requirements,
    FieldKey::CreatorPurchaseRequired,
    FieldKey::TargetAudience(AudienceField::AgeRange),
    FieldKey::TargetAudience(AudienceField::Gender),
    FieldKey::TargetAudience(AudienceField::Location),
    FieldKey::TargetAudience(AudienceField::Ethnicity),
    FieldKey::TargetAudience(AudienceField::Interests),
];

/// Every field currently shown for `draft`, with whether it must be filled.
pub fn active_fields(draft: &CampaignDraft) -> BTreeMap<FieldKey, Presence> {
    let mut fields = BTreeMap::new();
    fields.extend(ALWAYS_REQUIRED.into_iter().map(|key| (key, Presence::Required)));
    fields.extend(ALWAYS_OPTIONAL.into_iter().map(|key| (key, Presence::Optional)));

    if draft.has_budget_type(BudgetType::Gifted) {
        fields.insert(FieldKey::ProductServiceDescription, Presence::Required);
        fields.insert(FieldKey::ProductShipRequired, Presence::Optional);
    }
    if draft.has_budget_type(BudgetType::Affiliate) {
        fields.insert(FieldKey::AffiliateProgram, Presence::Optional);
    }
    if draft.has_goal(CampaignGoal::ContentDistribution) {
        fields.insert(FieldKey::TargetAudience(AudienceField::SocialChannel), Presence::Required);
        fields.insert(FieldKey::TargetAudience(AudienceField::AudienceSize), Presence::Required);
    }

    for (index, item) in draft.content_items.iter().enumerate() {
        let key = |field| FieldKey::content_item(index, field);
        fields.insert(key(ContentItemField::SocialChannel), Presence::Required);
        fields.insert(key(ContentItemField::Quantity), Presence::Required);
        fields.insert(key(ContentItemField::Description), Presence::Optional);
        match item.deliverable {
            Deliverable::Custom { .. } => fields.insert(key(ContentItemField::CustomTitle), Presence::Required),
            Deliverable::Standard { .. } | Deliverable::Unlisted { .. } | Deliverable::Unassigned => {
                fields.insert(key(ContentItemField::ContentType), Presence::Required)
            }
        };
    }

    fields
}

/// The set of fields that must be filled for `draft` to be publishable.
pub fn required_fields(draft: &CampaignDraft) -> BTreeSet<FieldKey> {
    active_fields(draft)
        .into_iter()
        .filter(|(_, presence)| *presence == Presence::Required)
        .map(|(key, _)| key)
        .collect()
}

pub fn is_active(draft: &CampaignDraft, field: FieldKey) -> bool {
    active_fields(draft).contains_key(&field)
}

pub fn is_required(draft: &CampaignDraft, field: FieldKey) -> bool {
    active_fields(draft).get(&field) == Some(&Presence::Required)
}
