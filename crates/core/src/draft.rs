//! Campaign draft domain types: the canonical in-memory shape of a
//! campaign being authored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Channel label that switches a content item to a free-form custom title.
pub const OTHER_CHANNEL_LABEL: &str = "Other";

// ─── Enumerations ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CampaignGoal {
    #[serde(rename = "Content Creation")]
    ContentCreation,
    #[serde(rename = "Content Distribution")]
    ContentDistribution,
}

impl CampaignGoal {
    pub const ALL: [CampaignGoal; 2] = [CampaignGoal::ContentCreation, CampaignGoal::ContentDistribution];

    pub fn label(&self) -> &'static str {
        match self {
            CampaignGoal::ContentCreation => "Content Creation",
            CampaignGoal::ContentDistribution => "Content Distribution",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(label.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    Paid,
    Gifted,
    Affiliate,
}

impl BudgetType {
    pub const ALL: [BudgetType; 3] = [BudgetType::Paid, BudgetType::Gifted, BudgetType::Affiliate];

    pub fn label(&self) -> &'static str {
        match self {
            BudgetType::Paid => "paid",
            BudgetType::Gifted => "gifted",
            BudgetType::Affiliate => "affiliate",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Social platforms a deliverable can target. The "Other" choice is not a
/// platform; it is modelled by [`Deliverable::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SocialChannel {
    Instagram,
    TikTok,
    YouTube,
    Facebook,
    X,
    Pinterest,
    LinkedIn,
    Snapchat,
    Twitch,
}

impl SocialChannel {
    pub const ALL: [SocialChannel; 9] = [
        SocialChannel::Instagram,
        SocialChannel::TikTok,
        SocialChannel::YouTube,
        SocialChannel::Facebook,
        SocialChannel::X,
        SocialChannel::Pinterest,
        SocialChannel::LinkedIn,
        SocialChannel::Snapchat,
        SocialChannel::Twitch,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SocialChannel::Instagram => "Instagram",
            SocialChannel::TikTok => "TikTok",
            SocialChannel::YouTube => "YouTube",
            SocialChannel::Facebook => "Facebook",
            SocialChannel::X => "X",
            SocialChannel::Pinterest => "Pinterest",
            SocialChannel::LinkedIn => "LinkedIn",
            SocialChannel::Snapchat => "Snapchat",
            SocialChannel::Twitch => "Twitch",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("twitter") {
            return Some(SocialChannel::X);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Post,
    Story,
    Reel,
    Video,
    Short,
    Livestream,
    Carousel,
    Review,
}

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        ContentType::Post,
        ContentType::Story,
        ContentType::Reel,
        ContentType::Video,
        ContentType::Short,
        ContentType::Livestream,
        ContentType::Carousel,
        ContentType::Review,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Post => "Post",
            ContentType::Story => "Story",
            ContentType::Reel => "Reel",
            ContentType::Video => "Video",
            ContentType::Short => "Short",
            ContentType::Livestream => "Livestream",
            ContentType::Carousel => "Carousel",
            ContentType::Review => "Review",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Persisted status marker sent alongside create/update calls.
///
/// Lifecycle statuses set outside the wizard (`completed`, `paused`, ...)
/// are carried as [`CampaignStatus::Other`] and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Other(String),
}

impl CampaignStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Other(status) => status,
        }
    }
}

impl From<String> for CampaignStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "draft" => CampaignStatus::Draft,
            "active" | "published" => CampaignStatus::Active,
            _ => CampaignStatus::Other(raw),
        }
    }
}

impl From<CampaignStatus> for String {
    fn from(status: CampaignStatus) -> Self {
        match status {
            CampaignStatus::Other(status) => status,
            status => status.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Image ─────────────────────────────────────────────────────────────────

/// Opaque image reference. The binary behind a `Local` handle is owned by
/// the upload collaborator and must be uploaded before it can be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    Local { handle: String },
    Uploaded { url: String },
}

// ─── Content items ─────────────────────────────────────────────────────────

/// What a content item asks the creator to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deliverable {
    /// No channel picked yet.
    Unassigned,
    Standard {
        channel: SocialChannel,
        content_type: Option<ContentType>,
    },
    /// The "Other" channel: a free-form title replaces the content type.
    Custom { custom_title: String },
    /// Channel and content type read from a stored record that are no
    /// longer offered. Kept verbatim until the user picks again.
    Unlisted { channel: String, content_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub deliverable: Deliverable,
    pub quantity: u32,
    pub description: String,
}

impl ContentItem {
    /// A fresh item with no channel and a quantity of one.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            deliverable: Deliverable::Unassigned,
            quantity: 1,
            description: String::new(),
        }
    }

    pub fn standard(channel: SocialChannel, content_type: ContentType, quantity: u32) -> Self {
        Self {
            deliverable: Deliverable::Standard {
                channel,
                content_type: Some(content_type),
            },
            quantity,
            ..Self::new()
        }
    }

    pub fn custom(custom_title: impl Into<String>, quantity: u32) -> Self {
        Self {
            deliverable: Deliverable::Custom {
                custom_title: custom_title.into(),
            },
            quantity,
            ..Self::new()
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.deliverable, Deliverable::Custom { .. })
    }

    pub fn has_channel(&self) -> bool {
        !matches!(self.deliverable, Deliverable::Unassigned)
    }

    /// Channel label as shown to the user, "Other" for custom items.
    pub fn channel_label(&self) -> Option<&str> {
        match &self.deliverable {
            Deliverable::Unassigned => None,
            Deliverable::Standard { channel, .. } => Some(channel.label()),
            Deliverable::Custom { .. } => Some(OTHER_CHANNEL_LABEL),
            Deliverable::Unlisted { channel, .. } => Some(channel.as_str()),
        }
    }
}

impl Default for ContentItem {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Target audience ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAudience {
    pub social_channel: Option<SocialChannel>,
    /// Stored channel label that is no longer offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlisted_social_channel: Option<String>,
    pub audience_size: BTreeSet<String>,
    pub age_range: BTreeSet<String>,
    pub gender: Option<String>,
    pub location: BTreeSet<String>,
    pub ethnicity: Option<String>,
    pub interests: BTreeSet<String>,
}

// ─── Campaign draft ────────────────────────────────────────────────────────

/// The campaign being authored. Treated as an immutable value: every edit
/// goes through [`CampaignDraft::apply`] and yields a new draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub identity: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub image: Option<ImageRef>,
    pub campaign_goal: BTreeSet<CampaignGoal>,
    /// Stored goal labels that are no longer offered, written back as-is.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlisted_goals: Vec<String>,
    pub budget_type: BTreeSet<BudgetType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlisted_budget_types: Vec<String>,
    pub budget: String,
    pub product_service_description: String,
    pub affiliate_program: String,
    pub requirements: String,
    pub creator_count: String,
    pub start_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub content_items: Vec<ContentItem>,
    pub target_audience: TargetAudience,
    pub creator_purchase_required: bool,
    pub product_ship_required: bool,
}

impl Default for CampaignDraft {
    fn default() -> Self {
        Self {
            identity: None,
            title: String::new(),
            description: String::new(),
            image: None,
            campaign_goal: BTreeSet::new(),
            unlisted_goals: Vec::new(),
            budget_type: BTreeSet::from([BudgetType::Paid]),
            unlisted_budget_types: Vec::new(),
            budget: String::new(),
            product_service_description: String::new(),
            affiliate_program: String::new(),
            requirements: String::new(),
            creator_count: String::new(),
            start_date: None,
            completion_date: None,
            content_items: Vec::new(),
            target_audience: TargetAudience::default(),
            creator_purchase_required: false,
            product_ship_required: false,
        }
    }
}

impl CampaignDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_budget_type(&self, budget_type: BudgetType) -> bool {
        self.budget_type.contains(&budget_type)
    }

    pub fn has_goal(&self, goal: CampaignGoal) -> bool {
        self.campaign_goal.contains(&goal)
    }

    /// True while the image still points at a local binary.
    pub fn has_pending_upload(&self) -> bool {
        matches!(self.image, Some(ImageRef::Local { .. }))
    }

    pub fn content_item(&self, id: &str) -> Option<&ContentItem> {
        self.content_items.iter().find(|item| item.id == id)
    }
}

// ─── Amount helpers ────────────────────────────────────────────────────────

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Parse a budget amount, ignoring any non-numeric formatting
/// (`"$1,500.00"` → `1500.0`). `None` when no number remains.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Budget text for re-populating an edit form. Currency symbols, spaces
/// and thousands separators are removed only when what is left is a plain
/// amount; anything else (`"$50/hour"`, `"10%"`) is returned unchanged.
pub fn display_amount(raw: &str) -> String {
    let trimmed = raw.trim();
    let pure_amount = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == ',' || c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c));
    if !pure_amount {
        return trimmed.to_string();
    }
    let stripped: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if stripped.is_empty() || stripped.matches('.').count() > 1 || stripped.parse::<f64>().is_err() {
        return trimmed.to_string();
    }
    stripped
}

/// Parse a text-encoded creator count.
pub fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft_has_paid_budget_type() {
        let draft = CampaignDraft::new();
        assert!(draft.has_budget_type(BudgetType::Paid));
        assert_eq!(draft.budget_type.len(), 1);
        assert!(draft.identity.is_none());
    }

    #[test]
    fn test_labels_round_trip() {
        for goal in CampaignGoal::ALL {
            assert_eq!(CampaignGoal::from_label(goal.label()), Some(goal));
        }
        for channel in SocialChannel::ALL {
            assert_eq!(SocialChannel::from_label(channel.label()), Some(channel));
        }
        assert_eq!(SocialChannel::from_label("twitter"), Some(SocialChannel::X));
        assert_eq!(BudgetType::from_label(" Gifted "), Some(BudgetType::Gifted));
        assert_eq!(ContentType::from_label("nonsense"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,500.00"), Some(1500.0));
        assert_eq!(parse_amount("$0"), Some(0.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_display_amount_keeps_meaningful_text() {
        assert_eq!(display_amount("$1,500.00"), "1500.00");
        assert_eq!(display_amount(" 250 "), "250");
        assert_eq!(display_amount("$50/hour"), "$50/hour");
        assert_eq!(display_amount("10%"), "10%");
        assert_eq!(display_amount(""), "");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(" 5 "), Some(5));
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("five"), None);
    }

    #[test]
    fn test_content_item_channel_label() {
        assert_eq!(ContentItem::new().channel_label(), None);
        assert_eq!(ContentItem::custom("Podcast", 1).channel_label(), Some("Other"));
        assert_eq!(
            ContentItem::standard(SocialChannel::TikTok, ContentType::Video, 2).channel_label(),
            Some("TikTok")
        );
        let unlisted = ContentItem {
            deliverable: Deliverable::Unlisted {
                channel: "Threads".to_string(),
                content_type: "Post".to_string(),
            },
            ..ContentItem::new()
        };
        assert_eq!(unlisted.channel_label(), Some("Threads"));
        assert!(unlisted.has_channel());
    }

    #[test]
    fn test_campaign_status_labels() {
        assert_eq!(CampaignStatus::from("published".to_string()), CampaignStatus::Active);
        assert_eq!(CampaignStatus::from(" Draft ".to_string()), CampaignStatus::Draft);
        assert_eq!(
            CampaignStatus::from("completed".to_string()),
            CampaignStatus::Other("completed".to_string())
        );
        assert_eq!(String::from(CampaignStatus::Active), "active");
        assert_eq!(CampaignStatus::Other("paused".to_string()).to_string(), "paused");
    }
}
