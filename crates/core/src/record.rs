//! Persisted campaign records and the normalization that turns stored
//! (possibly legacy) records into a [`CampaignDraft`].
//!
//! Older records stored scalars where sets are now expected, omitted whole
//! sub-objects, used `_id`, and encoded numbers as either JSON numbers or
//! strings. Deserialization accepts all of those; [`CampaignRecord`] as
//! written by [`CampaignDraft::to_record`] is always the canonical shape.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::draft::*;
use crate::error::CampaignResult;

// ─── Tolerant value shapes ─────────────────────────────────────────────────

/// A value stored either as a single scalar or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// A number that older records sometimes stored as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl Default for NumberOrText {
    fn default() -> Self {
        NumberOrText::Text(String::new())
    }
}

impl NumberOrText {
    pub fn to_text(&self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s.trim().to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_quantity() -> NumberOrText {
    NumberOrText::Number(serde_json::Number::from(1u32))
}

fn null_as_default_quantity<'de, D>(deserializer: D) -> Result<NumberOrText, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.unwrap_or_else(default_quantity))
}

// ─── Records ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItemRecord {
    #[serde(default, alias = "_id", deserialize_with = "null_as_default")]
    pub id: NumberOrText,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_channel: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_title: String,
    #[serde(default = "default_quantity", deserialize_with = "null_as_default_quantity")]
    pub quantity: NumberOrText,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAudienceRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_channel: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audience_size: OneOrMany<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub age_range: OneOrMany<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: OneOrMany<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ethnicity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: OneOrMany<String>,
}

/// A campaign as stored by the persistence backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Always a UUID; a record stored under any other id does not load.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub campaign_goal: OneOrMany<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget_type: OneOrMany<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget: NumberOrText,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_service_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub affiliate_program: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requirements: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creator_count: NumberOrText,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub completion_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_items: Vec<ContentItemRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_audience: TargetAudienceRecord,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creator_purchase_required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_ship_required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: CampaignStatus,
}

impl CampaignRecord {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a stored record from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> CampaignResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// ─── Normalization ─────────────────────────────────────────────────────────

/// Parse a stored date: either `YYYY-MM-DD` or an RFC 3339 timestamp, in
/// which case the calendar date at the stored offset is kept.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Split stored labels into the ones still offered and the ones that are
/// not. The latter are returned verbatim so they can be written back.
fn split_labels<T: Ord>(
    field: &str,
    values: OneOrMany<String>,
    parse: impl Fn(&str) -> Option<T>,
) -> (BTreeSet<T>, Vec<String>) {
    let mut known = BTreeSet::new();
    let mut unlisted: Vec<String> = Vec::new();
    for value in values.into_vec() {
        if value.trim().is_empty() {
            continue;
        }
        match parse(&value) {
            Some(parsed) => {
                known.insert(parsed);
            }
            None if !unlisted.contains(&value) => {
                warn!(field, value = %value, "Keeping unlisted value from stored campaign");
                unlisted.push(value);
            }
            None => {}
        }
    }
    (known, unlisted)
}

fn labels_to_record(known: impl Iterator<Item = &'static str>, unlisted: &[String]) -> OneOrMany<String> {
    OneOrMany::Many(
        known
            .map(str::to_string)
            .chain(unlisted.iter().cloned())
            .collect(),
    )
}

fn text_set(values: OneOrMany<String>) -> BTreeSet<String> {
    values
        .into_vec()
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn optional_text(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn content_item_from_record(index: usize, record: ContentItemRecord) -> ContentItem {
    let id = match record.id.to_text() {
        id if id.is_empty() => Uuid::new_v4().to_string(),
        id => id,
    };
    let channel_label = record.social_channel.trim();

    let deliverable = if channel_label.is_empty() {
        Deliverable::Unassigned
    } else if channel_label.eq_ignore_ascii_case(OTHER_CHANNEL_LABEL) {
        Deliverable::Custom {
            custom_title: record.custom_title,
        }
    } else {
        let type_label = record.content_type.trim();
        let content_type = ContentType::from_label(type_label);
        match SocialChannel::from_label(channel_label) {
            Some(channel) if type_label.is_empty() || content_type.is_some() => Deliverable::Standard {
                channel,
                content_type,
            },
            _ => {
                warn!(
                    index,
                    channel = %channel_label,
                    content_type = %type_label,
                    "Keeping unlisted deliverable from stored campaign"
                );
                Deliverable::Unlisted {
                    channel: channel_label.to_string(),
                    content_type: type_label.to_string(),
                }
            }
        }
    };

    // Unparsable quantities become 0 so validation flags them.
    let quantity = record.quantity.to_text().parse::<u32>().unwrap_or(0);

    ContentItem {
        id,
        deliverable,
        quantity,
        description: record.description,
    }
}

fn content_item_to_record(item: &ContentItem) -> ContentItemRecord {
    let (social_channel, content_type, custom_title) = match &item.deliverable {
        Deliverable::Unassigned => (String::new(), String::new(), String::new()),
        Deliverable::Standard {
            channel,
            content_type,
        } => (
            channel.label().to_string(),
            content_type.map(|t| t.label().to_string()).unwrap_or_default(),
            String::new(),
        ),
        Deliverable::Custom { custom_title } => {
            (OTHER_CHANNEL_LABEL.to_string(), String::new(), custom_title.clone())
        }
        Deliverable::Unlisted {
            channel,
            content_type,
        } => (channel.clone(), content_type.clone(), String::new()),
    };
    ContentItemRecord {
        id: NumberOrText::Text(item.id.clone()),
        social_channel,
        content_type,
        custom_title,
        quantity: NumberOrText::Number(item.quantity.into()),
        description: item.description.clone(),
    }
}

impl CampaignDraft {
    /// Reconcile a stored record into the current draft shape.
    pub fn from_record(record: CampaignRecord) -> Self {
        let (campaign_goal, unlisted_goals) =
            split_labels("campaignGoal", record.campaign_goal, CampaignGoal::from_label);
        let (mut budget_type, unlisted_budget_types) =
            split_labels("budgetType", record.budget_type, BudgetType::from_label);
        if budget_type.is_empty() && unlisted_budget_types.is_empty() {
            debug!("Stored campaign has no budget type, defaulting to paid");
            budget_type.insert(BudgetType::Paid);
        }

        let audience = record.target_audience;
        let audience_channel = audience.social_channel.trim();
        let social_channel = SocialChannel::from_label(audience_channel);
        let unlisted_social_channel = match social_channel {
            None if !audience_channel.is_empty() => {
                warn!(value = %audience_channel, "Keeping unlisted audience channel from stored campaign");
                Some(audience_channel.to_string())
            }
            _ => None,
        };
        let target_audience = TargetAudience {
            social_channel,
            unlisted_social_channel,
            audience_size: text_set(audience.audience_size),
            age_range: text_set(audience.age_range),
            gender: optional_text(audience.gender),
            location: text_set(audience.location),
            ethnicity: optional_text(audience.ethnicity),
            interests: text_set(audience.interests),
        };

        CampaignDraft {
            identity: record.id,
            title: record.title,
            description: record.description,
            image: record
                .image
                .and_then(optional_text)
                .map(|url| ImageRef::Uploaded { url }),
            campaign_goal,
            unlisted_goals,
            budget_type,
            unlisted_budget_types,
            budget: display_amount(&record.budget.to_text()),
            product_service_description: record.product_service_description,
            affiliate_program: record.affiliate_program,
            requirements: record.requirements,
            creator_count: record.creator_count.to_text(),
            start_date: record.start_date.as_deref().and_then(parse_record_date),
            completion_date: record.completion_date.as_deref().and_then(parse_record_date),
            content_items: record
                .content_items
                .into_iter()
                .enumerate()
                .map(|(index, item)| content_item_from_record(index, item))
                .collect(),
            target_audience,
            creator_purchase_required: record.creator_purchase_required,
            product_ship_required: record.product_ship_required,
        }
    }

    /// The canonical stored shape of this draft.
    pub fn to_record(&self, status: CampaignStatus) -> CampaignRecord {
        let image = match &self.image {
            Some(ImageRef::Uploaded { url }) => Some(url.clone()),
            Some(ImageRef::Local { handle }) => {
                debug!(handle = %handle, "Image not uploaded yet, omitted from record");
                None
            }
            None => None,
        };
        let audience = &self.target_audience;

        CampaignRecord {
            id: self.identity,
            title: self.title.clone(),
            description: self.description.clone(),
            image,
            campaign_goal: labels_to_record(self.campaign_goal.iter().map(|g| g.label()), &self.unlisted_goals),
            budget_type: labels_to_record(
                self.budget_type.iter().map(|b| b.label()),
                &self.unlisted_budget_types,
            ),
            budget: NumberOrText::Text(self.budget.clone()),
            product_service_description: self.product_service_description.clone(),
            affiliate_program: self.affiliate_program.clone(),
            requirements: self.requirements.clone(),
            creator_count: NumberOrText::Text(self.creator_count.clone()),
            start_date: format_date(self.start_date),
            completion_date: format_date(self.completion_date),
            content_items: self.content_items.iter().map(content_item_to_record).collect(),
            target_audience: TargetAudienceRecord {
                social_channel: audience
                    .social_channel
                    .map(|c| c.label().to_string())
                    .or_else(|| audience.unlisted_social_channel.clone())
                    .unwrap_or_default(),
                audience_size: OneOrMany::Many(audience.audience_size.iter().cloned().collect()),
                age_range: OneOrMany::Many(audience.age_range.iter().cloned().collect()),
                gender: audience.gender.clone().unwrap_or_default(),
                location: OneOrMany::Many(audience.location.iter().cloned().collect()),
                ethnicity: audience.ethnicity.clone().unwrap_or_default(),
                interests: OneOrMany::Many(audience.interests.iter().cloned().collect()),
            },
            creator_purchase_required: self.creator_purchase_required,
            product_ship_required: self.product_ship_required,
            status,
        }
    }
}
