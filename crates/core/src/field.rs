//! Typed field keys shared by the resolver, the validator and the
//! presentation layer.

use serde::{Serialize, Serializer};
use std::fmt;

/// A field of a content item, addressed by the item's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentItemField {
    SocialChannel,
    ContentType,
    CustomTitle,
    Quantity,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudienceField {
    SocialChannel,
    AudienceSize,
    AgeRange,
    Gender,
    Location,
    Ethnicity,
    Interests,
}

/// Every addressable field of a campaign draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Title,
    Description,
    Image,
    CampaignGoal,
    BudgetType,
    Budget,
    ProductServiceDescription,
    AffiliateProgram,
    Requirements,
    CreatorCount,
    StartDate,
    CompletionDate,
    CreatorPurchaseRequired,
    ProductShipRequired,
    ContentItems,
    ContentItem {
        index: usize,
        field: ContentItemField,
    },
    TargetAudience(AudienceField),
}

impl FieldKey {
    pub fn content_item(index: usize, field: ContentItemField) -> Self {
        FieldKey::ContentItem { index, field }
    }

    /// Whether the key addresses something inside `contentItems`.
    pub fn is_content_item(&self) -> bool {
        matches!(self, FieldKey::ContentItems | FieldKey::ContentItem { .. })
    }
}

impl fmt::Display for ContentItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentItemField::SocialChannel => "socialChannel",
            ContentItemField::ContentType => "contentType",
            ContentItemField::CustomTitle => "customTitle",
            ContentItemField::Quantity => "quantity",
            ContentItemField::Description => "description",
        };
        f.write_str(name)
    }
}

impl fmt::Display for AudienceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudienceField::SocialChannel => "socialChannel",
            AudienceField::AudienceSize => "audienceSize",
            AudienceField::AgeRange => "ageRange",
            AudienceField::Gender => "gender",
            AudienceField::Location => "location",
            AudienceField::Ethnicity => "ethnicity",
            AudienceField::Interests => "interests",
        };
        f.write_str(name)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Title => f.write_str("title"),
            FieldKey::Description => f.write_str("description"),
            FieldKey::Image => f.write_str("image"),
            FieldKey::CampaignGoal => f.write_str("campaignGoal"),
            FieldKey::BudgetType => f.write_str("budgetType"),
            FieldKey::Budget => f.write_str("budget"),
            FieldKey::ProductServiceDescription => f.write_str("productServiceDescription"),
            FieldKey::AffiliateProgram => f.write_str("affiliateProgram"),
            FieldKey::Requirements => f.write_str("requirements"),
            FieldKey::CreatorCount => f.write_str("creatorCount"),
            FieldKey::StartDate => f.write_str("startDate"),
            FieldKey::CompletionDate => f.write_str("completionDate"),
            FieldKey::CreatorPurchaseRequired => f.write_str("creatorPurchaseRequired"),
            FieldKey::ProductShipRequired => f.write_str("productShipRequired"),
            FieldKey::ContentItems => f.write_str("contentItems"),
            FieldKey::ContentItem { index, field } => write!(f, "contentItems[{}].{}", index, field),
            FieldKey::TargetAudience(field) => write!(f, "targetAudience.{}", field),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single validation failure. Returned in batches, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: FieldKey,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FieldKey, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_paths() {
        assert_eq!(FieldKey::CampaignGoal.to_string(), "campaignGoal");
        assert_eq!(
            FieldKey::content_item(2, ContentItemField::CustomTitle).to_string(),
            "contentItems[2].customTitle"
        );
        assert_eq!(
            FieldKey::TargetAudience(AudienceField::AudienceSize).to_string(),
            "targetAudience.audienceSize"
        );
    }

    #[test]
    fn test_field_error_serializes_path() {
        let err = FieldError::new(FieldKey::content_item(0, ContentItemField::Quantity), "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "contentItems[0].quantity");
        assert_eq!(json["message"], "bad");
    }
}
