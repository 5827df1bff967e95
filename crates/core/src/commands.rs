//! Typed field-update commands. Each command names exactly one logical
//! field; applying it yields a new draft and leaves the original untouched.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::draft::*;
use crate::error::{CampaignError, CampaignResult};
use crate::field::{AudienceField, FieldKey};

/// Channel selection for a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelChoice {
    Unassigned,
    Platform(SocialChannel),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItemChange {
    SetChannel(ChannelChoice),
    SetContentType(Option<ContentType>),
    SetCustomTitle(String),
    SetQuantity(u32),
    SetDescription(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudienceChange {
    SetSocialChannel(Option<SocialChannel>),
    SetAudienceSize(BTreeSet<String>),
    SetAgeRange(BTreeSet<String>),
    SetGender(Option<String>),
    SetLocation(BTreeSet<String>),
    SetEthnicity(Option<String>),
    SetInterests(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftCommand {
    SetTitle(String),
    SetDescription(String),
    SetImage(Option<ImageRef>),
    SetCampaignGoals(BTreeSet<CampaignGoal>),
    ToggleCampaignGoal(CampaignGoal),
    SetBudgetTypes(BTreeSet<BudgetType>),
    ToggleBudgetType(BudgetType),
    SetBudget(String),
    SetProductServiceDescription(String),
    SetAffiliateProgram(String),
    SetRequirements(String),
    SetCreatorCount(String),
    SetStartDate(Option<NaiveDate>),
    SetCompletionDate(Option<NaiveDate>),
    SetCreatorPurchaseRequired(bool),
    SetProductShipRequired(bool),
    AddContentItem(ContentItem),
    RemoveContentItem(String),
    UpdateContentItem { id: String, change: ContentItemChange },
    UpdateAudience(AudienceChange),
}

impl DraftCommand {
    /// The field this command writes.
    pub fn field(&self) -> FieldKey {
        match self {
            DraftCommand::SetTitle(_) => FieldKey::Title,
            DraftCommand::SetDescription(_) => FieldKey::Description,
            DraftCommand::SetImage(_) => FieldKey::Image,
            DraftCommand::SetCampaignGoals(_) | DraftCommand::ToggleCampaignGoal(_) => FieldKey::CampaignGoal,
            DraftCommand::SetBudgetTypes(_) | DraftCommand::ToggleBudgetType(_) => FieldKey::BudgetType,
            DraftCommand::SetBudget(_) => FieldKey::Budget,
            DraftCommand::SetProductServiceDescription(_) => FieldKey::ProductServiceDescription,
            DraftCommand::SetAffiliateProgram(_) => FieldKey::AffiliateProgram,
            DraftCommand::SetRequirements(_) => FieldKey::Requirements,
            DraftCommand::SetCreatorCount(_) => FieldKey::CreatorCount,
            DraftCommand::SetStartDate(_) => FieldKey::StartDate,
            DraftCommand::SetCompletionDate(_) => FieldKey::CompletionDate,
            DraftCommand::SetCreatorPurchaseRequired(_) => FieldKey::CreatorPurchaseRequired,
            DraftCommand::SetProductShipRequired(_) => FieldKey::ProductShipRequired,
            DraftCommand::AddContentItem(_)
            | DraftCommand::RemoveContentItem(_)
            | DraftCommand::UpdateContentItem { .. } => FieldKey::ContentItems,
            DraftCommand::UpdateAudience(change) => FieldKey::TargetAudience(match change {
                AudienceChange::SetSocialChannel(_) => AudienceField::SocialChannel,
                AudienceChange::SetAudienceSize(_) => AudienceField::AudienceSize,
                AudienceChange::SetAgeRange(_) => AudienceField::AgeRange,
                AudienceChange::SetGender(_) => AudienceField::Gender,
                AudienceChange::SetLocation(_) => AudienceField::Location,
                AudienceChange::SetEthnicity(_) => AudienceField::Ethnicity,
                AudienceChange::SetInterests(_) => AudienceField::Interests,
            }),
        }
    }
}

fn apply_item_change(item: &mut ContentItem, change: ContentItemChange) -> CampaignResult<()> {
    match change {
        ContentItemChange::SetChannel(choice) => {
            item.deliverable = match (choice, &item.deliverable) {
                (ChannelChoice::Unassigned, _) => Deliverable::Unassigned,
                (ChannelChoice::Other, Deliverable::Custom { custom_title }) => Deliverable::Custom {
                    custom_title: custom_title.clone(),
                },
                (ChannelChoice::Other, _) => Deliverable::Custom {
                    custom_title: String::new(),
                },
                // Content types are channel-agnostic, so they survive a platform switch.
                (ChannelChoice::Platform(channel), Deliverable::Standard { content_type, .. }) => {
                    Deliverable::Standard {
                        channel,
                        content_type: *content_type,
                    }
                }
                (ChannelChoice::Platform(channel), Deliverable::Unlisted { content_type, .. }) => {
                    Deliverable::Standard {
                        channel,
                        content_type: ContentType::from_label(content_type),
                    }
                }
                (ChannelChoice::Platform(channel), _) => Deliverable::Standard {
                    channel,
                    content_type: None,
                },
            };
        }
        ContentItemChange::SetContentType(new_type) => {
            let channel = match &item.deliverable {
                Deliverable::Standard { channel, .. } => Some(*channel),
                Deliverable::Unlisted { channel, .. } => SocialChannel::from_label(channel),
                _ => None,
            };
            let Some(channel) = channel else {
                return Err(CampaignError::InvalidCommand(format!(
                    "content item {} has no platform channel, content type cannot be set",
                    item.id
                )));
            };
            item.deliverable = Deliverable::Standard {
                channel,
                content_type: new_type,
            };
        }
        ContentItemChange::SetCustomTitle(title) => match &mut item.deliverable {
            Deliverable::Custom { custom_title } => *custom_title = title,
            _ => {
                return Err(CampaignError::InvalidCommand(format!(
                    "content item {} is not on the Other channel, custom title cannot be set",
                    item.id
                )))
            }
        },
        ContentItemChange::SetQuantity(quantity) => item.quantity = quantity,
        ContentItemChange::SetDescription(description) => item.description = description,
    }
    Ok(())
}

fn apply_audience_change(audience: &mut TargetAudience, change: AudienceChange) {
    match change {
        AudienceChange::SetSocialChannel(channel) => {
            audience.social_channel = channel;
            audience.unlisted_social_channel = None;
        }
        AudienceChange::SetAudienceSize(sizes) => audience.audience_size = sizes,
        AudienceChange::SetAgeRange(ranges) => audience.age_range = ranges,
        AudienceChange::SetGender(gender) => audience.gender = gender,
        AudienceChange::SetLocation(locations) => audience.location = locations,
        AudienceChange::SetEthnicity(ethnicity) => audience.ethnicity = ethnicity,
        AudienceChange::SetInterests(interests) => audience.interests = interests,
    }
}

impl CampaignDraft {
    /// Apply one command, returning the updated draft. The receiver is
    /// never modified; a rejected command leaves no partial edit behind.
    pub fn apply(&self, command: DraftCommand) -> CampaignResult<CampaignDraft> {
        let mut next = self.clone();
        match command {
            DraftCommand::SetTitle(title) => next.title = title,
            DraftCommand::SetDescription(description) => next.description = description,
            DraftCommand::SetImage(image) => next.image = image,
            DraftCommand::SetCampaignGoals(goals) => next.campaign_goal = goals,
            DraftCommand::ToggleCampaignGoal(goal) => {
                if !next.campaign_goal.remove(&goal) {
                    next.campaign_goal.insert(goal);
                }
            }
            DraftCommand::SetBudgetTypes(types) => {
                if types.is_empty() {
                    return Err(CampaignError::InvalidCommand(
                        "at least one budget type must stay selected".to_string(),
                    ));
                }
                next.budget_type = types;
            }
            DraftCommand::ToggleBudgetType(budget_type) => {
                if next.budget_type.contains(&budget_type) {
                    if next.budget_type.len() == 1 {
                        return Err(CampaignError::InvalidCommand(
                            "at least one budget type must stay selected".to_string(),
                        ));
                    }
                    next.budget_type.remove(&budget_type);
                } else {
                    next.budget_type.insert(budget_type);
                }
            }
            DraftCommand::SetBudget(budget) => next.budget = budget,
            DraftCommand::SetProductServiceDescription(text) => next.product_service_description = text,
            DraftCommand::SetAffiliateProgram(text) => next.affiliate_program = text,
            DraftCommand::SetRequirements(text) => next.requirements = text,
            DraftCommand::SetCreatorCount(count) => next.creator_count = count,
            DraftCommand::SetStartDate(date) => next.start_date = date,
            DraftCommand::SetCompletionDate(date) => next.completion_date = date,
            DraftCommand::SetCreatorPurchaseRequired(flag) => next.creator_purchase_required = flag,
            DraftCommand::SetProductShipRequired(flag) => next.product_ship_required = flag,
            DraftCommand::AddContentItem(item) => {
                if next.content_item(&item.id).is_some() {
                    return Err(CampaignError::InvalidCommand(format!(
                        "content item {} already exists",
                        item.id
                    )));
                }
                next.content_items.push(item);
            }
            DraftCommand::RemoveContentItem(id) => {
                let before = next.content_items.len();
                next.content_items.retain(|item| item.id != id);
                if next.content_items.len() == before {
                    return Err(CampaignError::InvalidCommand(format!("unknown content item {}", id)));
                }
            }
            DraftCommand::UpdateContentItem { id, change } => {
                let item = next
                    .content_items
                    .iter_mut()
                    .find(|item| item.id == id)
                    .ok_or_else(|| CampaignError::InvalidCommand(format!("unknown content item {}", id)))?;
                apply_item_change(item, change)?;
            }
            DraftCommand::UpdateAudience(change) => apply_audience_change(&mut next.target_audience, change),
        }
        Ok(next)
    }

    /// Apply a sequence of commands; stops at the first rejected one.
    pub fn apply_all(&self, commands: impl IntoIterator<Item = DraftCommand>) -> CampaignResult<CampaignDraft> {
        commands
            .into_iter()
            .try_fold(self.clone(), |draft, command| draft.apply(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_copy_on_write() {
        let original = CampaignDraft::new();
        let updated = original.apply(DraftCommand::SetTitle("Launch".to_string())).unwrap();
        assert_eq!(updated.title, "Launch");
        assert_eq!(original.title, "");
    }

    #[test]
    fn test_last_budget_type_cannot_be_removed() {
        let draft = CampaignDraft::new();
        let err = draft.apply(DraftCommand::ToggleBudgetType(BudgetType::Paid)).unwrap_err();
        assert!(matches!(err, CampaignError::InvalidCommand(_)));

        let err = draft.apply(DraftCommand::SetBudgetTypes(BTreeSet::new())).unwrap_err();
        assert!(matches!(err, CampaignError::InvalidCommand(_)));

        let draft = draft.apply(DraftCommand::ToggleBudgetType(BudgetType::Gifted)).unwrap();
        let draft = draft.apply(DraftCommand::ToggleBudgetType(BudgetType::Paid)).unwrap();
        assert_eq!(draft.budget_type, BTreeSet::from([BudgetType::Gifted]));
    }

    #[test]
    fn test_toggle_goal() {
        let draft = CampaignDraft::new()
            .apply(DraftCommand::ToggleCampaignGoal(CampaignGoal::ContentDistribution))
            .unwrap();
        assert!(draft.has_goal(CampaignGoal::ContentDistribution));
        let draft = draft
            .apply(DraftCommand::ToggleCampaignGoal(CampaignGoal::ContentDistribution))
            .unwrap();
        assert!(draft.campaign_goal.is_empty());
    }

    #[test]
    fn test_channel_switch_changes_deliverable_shape() {
        let item = ContentItem::new();
        let id = item.id.clone();
        let draft = CampaignDraft::new().apply(DraftCommand::AddContentItem(item)).unwrap();

        let draft = draft
            .apply_all([
                DraftCommand::UpdateContentItem {
                    id: id.clone(),
                    change: ContentItemChange::SetChannel(ChannelChoice::Platform(SocialChannel::Instagram)),
                },
                DraftCommand::UpdateContentItem {
                    id: id.clone(),
                    change: ContentItemChange::SetContentType(Some(ContentType::Reel)),
                },
                DraftCommand::UpdateContentItem {
                    id: id.clone(),
                    change: ContentItemChange::SetChannel(ChannelChoice::Platform(SocialChannel::TikTok)),
                },
            ])
            .unwrap();
        assert_eq!(
            draft.content_item(&id).unwrap().deliverable,
            Deliverable::Standard {
                channel: SocialChannel::TikTok,
                content_type: Some(ContentType::Reel)
            }
        );

        let draft = draft
            .apply(DraftCommand::UpdateContentItem {
                id: id.clone(),
                change: ContentItemChange::SetChannel(ChannelChoice::Other),
            })
            .unwrap();
        assert_eq!(
            draft.content_item(&id).unwrap().deliverable,
            Deliverable::Custom {
                custom_title: String::new()
            }
        );

        let err = draft
            .apply(DraftCommand::UpdateContentItem {
                id,
                change: ContentItemChange::SetContentType(Some(ContentType::Post)),
            })
            .unwrap_err();
        assert!(matches!(err, CampaignError::InvalidCommand(_)));
    }

    #[test]
    fn test_unlisted_deliverable_is_replaced_by_a_pick() {
        let mut item = ContentItem::new();
        item.deliverable = Deliverable::Unlisted {
            channel: "Instagram".to_string(),
            content_type: "Podcast".to_string(),
        };
        let id = item.id.clone();
        let draft = CampaignDraft::new().apply(DraftCommand::AddContentItem(item)).unwrap();

        let retyped = draft
            .apply(DraftCommand::UpdateContentItem {
                id: id.clone(),
                change: ContentItemChange::SetContentType(Some(ContentType::Reel)),
            })
            .unwrap();
        assert_eq!(
            retyped.content_item(&id).unwrap().deliverable,
            Deliverable::Standard {
                channel: SocialChannel::Instagram,
                content_type: Some(ContentType::Reel)
            }
        );

        let mut threads = ContentItem::new();
        threads.deliverable = Deliverable::Unlisted {
            channel: "Threads".to_string(),
            content_type: "Post".to_string(),
        };
        let threads_id = threads.id.clone();
        let draft = draft.apply(DraftCommand::AddContentItem(threads)).unwrap();
        let err = draft
            .apply(DraftCommand::UpdateContentItem {
                id: threads_id.clone(),
                change: ContentItemChange::SetContentType(Some(ContentType::Post)),
            })
            .unwrap_err();
        assert!(matches!(err, CampaignError::InvalidCommand(_)));

        let moved = draft
            .apply(DraftCommand::UpdateContentItem {
                id: threads_id.clone(),
                change: ContentItemChange::SetChannel(ChannelChoice::Platform(SocialChannel::Facebook)),
            })
            .unwrap();
        assert_eq!(
            moved.content_item(&threads_id).unwrap().deliverable,
            Deliverable::Standard {
                channel: SocialChannel::Facebook,
                content_type: Some(ContentType::Post)
            }
        );
    }

    #[test]
    fn test_picking_audience_channel_clears_unlisted_label() {
        let mut draft = CampaignDraft::new();
        draft.target_audience.unlisted_social_channel = Some("Threads".to_string());
        let draft = draft
            .apply(DraftCommand::UpdateAudience(AudienceChange::SetSocialChannel(Some(
                SocialChannel::TikTok,
            ))))
            .unwrap();
        assert_eq!(draft.target_audience.social_channel, Some(SocialChannel::TikTok));
        assert!(draft.target_audience.unlisted_social_channel.is_none());
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let err = CampaignDraft::new()
            .apply(DraftCommand::RemoveContentItem("missing".to_string()))
            .unwrap_err();
        assert!(matches!(err, CampaignError::InvalidCommand(_)));
    }

    #[test]
    fn test_failed_batch_leaves_no_partial_edit() {
        let original = CampaignDraft::new();
        let result = original.apply_all([
            DraftCommand::SetTitle("Half applied".to_string()),
            DraftCommand::RemoveContentItem("missing".to_string()),
        ]);
        assert!(result.is_err());
        assert_eq!(original.title, "");
    }

    #[test]
    fn test_command_field_keys() {
        assert_eq!(DraftCommand::SetBudget(String::new()).field(), FieldKey::Budget);
        assert_eq!(
            DraftCommand::UpdateAudience(AudienceChange::SetAudienceSize(BTreeSet::new())).field(),
            FieldKey::TargetAudience(AudienceField::AudienceSize)
        );
    }
}
