//! Composite business metrics derived from profile and conversation rows.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::grouping::GroupedCounts;
use super::scalar::{self, Cents};
use crate::models::activity::Conversation;
use crate::models::profile::{Profile, SubscriptionStatus, SubscriptionTier};

/// Monthly list price of the premium tier.
pub const PREMIUM_PRICE: Cents = Cents(1299);
/// Monthly list price of the pro tier.
pub const PRO_PRICE: Cents = Cents(2499);
/// Estimated model cost of one AI coach message.
pub const COST_PER_MESSAGE: Cents = Cents(2);

pub const TRIAL_WARNING_DAYS: i64 = 3;
pub const CHURN_WINDOW_DAYS: i64 = 30;
pub const LONGEST_CONVERSATIONS: usize = 10;

/// Tier breakdown in canonical order (free, premium, pro, then unknown tiers).
pub fn tier_breakdown(profiles: &[Profile]) -> GroupedCounts {
    GroupedCounts::tally(
        profiles,
        |p| p.subscription_tier.as_deref(),
        SubscriptionTier::KEYS,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Revenue {
    pub mrr: Cents,
    pub arr: Cents,
}

/// MRR = premium × 12.99 + pro × 24.99; ARR = MRR × 12.
pub fn revenue(tiers: &GroupedCounts) -> Revenue {
    let mrr = PREMIUM_PRICE.times(tiers.get(SubscriptionTier::Premium.as_str()))
        + PRO_PRICE.times(tiers.get(SubscriptionTier::Pro.as_str()));
    Revenue {
        mrr,
        arr: mrr.times(12),
    }
}

/// Share of profiles on a paid tier, one decimal.
pub fn conversion_rate(tiers: &GroupedCounts, total_profiles: u64) -> f64 {
    let paying = tiers.get(SubscriptionTier::Premium.as_str())
        + tiers.get(SubscriptionTier::Pro.as_str());
    scalar::percentage(paying, total_profiles)
}

/// Paid tier with an active status.
pub fn active_subscribers(profiles: &[Profile]) -> u64 {
    scalar::count_where(profiles, |p| {
        p.is_paying() && p.has_status(SubscriptionStatus::Active)
    })
}

/// Trials ending strictly between now and now + 3 days.
pub fn trials_expiring_soon(profiles: &[Profile], now: DateTime<Utc>) -> Vec<Profile> {
    let horizon = now + Duration::days(TRIAL_WARNING_DAYS);
    profiles
        .iter()
        .filter(|p| p.trial_end_date.is_some_and(|end| end > now && end < horizon))
        .cloned()
        .collect()
}

/// Cancelled subscriptions last updated within the churn window.
pub fn recently_cancelled(profiles: &[Profile], now: DateTime<Utc>) -> Vec<Profile> {
    profiles
        .iter()
        .filter(|p| {
            p.has_status(SubscriptionStatus::Cancelled)
                && scalar::created_within(p.updated_at, now, CHURN_WINDOW_DAYS)
        })
        .cloned()
        .collect()
}

pub fn total_messages(conversations: &[Conversation]) -> u64 {
    scalar::sum_by(conversations, Conversation::message_count)
}

/// Messages in conversations started within the last `days`.
pub fn messages_within(conversations: &[Conversation], now: DateTime<Utc>, days: i64) -> u64 {
    conversations
        .iter()
        .filter(|c| scalar::created_within(c.created_at, now, days))
        .map(Conversation::message_count)
        .sum()
}

pub fn ai_cost_estimate(monthly_messages: u64) -> Cents {
    COST_PER_MESSAGE.times(monthly_messages)
}

/// Mean messages per conversation, one decimal, 0 when there are none.
pub fn avg_messages_per_conversation(conversations: &[Conversation]) -> f64 {
    scalar::ratio1(total_messages(conversations), scalar::count(conversations))
}

pub fn unique_users(conversations: &[Conversation]) -> u64 {
    conversations
        .iter()
        .filter_map(|c| c.user_id)
        .collect::<HashSet<Uuid>>()
        .len() as u64
}

/// Conversation trimmed to what the usage page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub topic: String,
    pub message_count: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Conversation> for ConversationSummary {
    fn from(c: &Conversation) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            topic: c.topic_or_default().to_string(),
            message_count: c.message_count(),
            created_at: c.created_at,
        }
    }
}

/// Top conversations by message count, descending; ties keep input order.
pub fn longest_conversations(conversations: &[Conversation]) -> Vec<ConversationSummary> {
    let mut ranked: Vec<ConversationSummary> =
        conversations.iter().map(ConversationSummary::from).collect();
    ranked.sort_by(|a, b| b.message_count.cmp(&a.message_count));
    ranked.truncate(LONGEST_CONVERSATIONS);
    ranked
}

/// Topic with its share of all conversations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicShare {
    pub topic: String,
    pub count: u64,
    pub share_pct: f64,
}

/// Topics by popularity. Missing topics count as `general`.
pub fn topic_popularity(conversations: &[Conversation]) -> Vec<TopicShare> {
    let total = scalar::count(conversations);
    GroupedCounts::tally(conversations, |c| Some(c.topic_or_default()), &[])
        .sorted_desc()
        .iter()
        .map(|g| TopicShare {
            topic: g.key.clone(),
            count: g.count,
            share_pct: scalar::percentage(g.count, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::fixtures::conversation;
    use crate::models::profile::fixtures::profile;

    fn population() -> Vec<Profile> {
        let mut profiles = Vec::new();
        profiles.extend((0..10).map(|_| profile(Some("free"), Some("active"))));
        profiles.extend((0..3).map(|_| profile(Some("premium"), Some("active"))));
        profiles.extend((0..2).map(|_| profile(Some("pro"), Some("trial"))));
        profiles
    }

    #[test]
    fn mrr_and_arr() {
        let tiers = tier_breakdown(&population());
        let rev = revenue(&tiers);
        assert_eq!(rev.mrr, Cents(8895));
        assert_eq!(rev.mrr.dollars(), 88.95);
        assert_eq!(rev.arr, Cents(106740));
        assert_eq!(rev.arr.dollars(), 1067.40);
    }

    #[test]
    fn conversion_rate_one_decimal() {
        let profiles = population();
        let tiers = tier_breakdown(&profiles);
        assert_eq!(conversion_rate(&tiers, profiles.len() as u64), 33.3);
        assert_eq!(conversion_rate(&GroupedCounts::default(), 0), 0.0);
    }

    #[test]
    fn active_subscribers_excludes_free_and_trials() {
        assert_eq!(active_subscribers(&population()), 3);
    }

    #[test]
    fn trial_window_is_exclusive() {
        let now = Utc::now();
        let mut profiles = Vec::new();
        for offset_hours in [-1, 1, 71, 72, 100] {
            let mut p = profile(Some("premium"), Some("trial"));
            p.trial_end_date = Some(now + Duration::hours(offset_hours));
            profiles.push(p);
        }
        profiles.push(profile(Some("premium"), Some("trial")));
        let expiring = trials_expiring_soon(&profiles, now);
        assert_eq!(expiring.len(), 2);
    }

    #[test]
    fn churn_counts_recent_cancellations_only() {
        let now = Utc::now();
        let mut recent = profile(Some("free"), Some("cancelled"));
        recent.updated_at = Some(now - Duration::days(3));
        let mut old = profile(Some("free"), Some("cancelled"));
        old.updated_at = Some(now - Duration::days(45));
        let mut undated = profile(Some("free"), Some("cancelled"));
        undated.updated_at = None;
        let mut active = profile(Some("pro"), Some("active"));
        active.updated_at = Some(now);

        let churned = recently_cancelled(&[recent, old, undated, active], now);
        assert_eq!(churned.len(), 1);
    }

    #[test]
    fn ai_cost_and_average() {
        let now = Utc::now();
        let convos = vec![
            conversation(4, Some(now - Duration::days(1))),
            conversation(6, Some(now - Duration::days(10))),
            conversation(5, Some(now - Duration::days(40))),
            conversation(1, None),
        ];
        assert_eq!(total_messages(&convos), 16);
        assert_eq!(messages_within(&convos, now, 7), 4);
        assert_eq!(messages_within(&convos, now, 30), 10);
        assert_eq!(ai_cost_estimate(10), Cents(20));
        assert_eq!(avg_messages_per_conversation(&convos), 4.0);
        assert_eq!(avg_messages_per_conversation(&[]), 0.0);
    }

    #[test]
    fn longest_conversations_top_ten_stable() {
        let lengths = [1, 5, 3, 9, 2, 5, 7, 0, 4, 6, 8, 5];
        let convos: Vec<Conversation> = lengths.iter().map(|&n| conversation(n, None)).collect();
        let top = longest_conversations(&convos);
        assert_eq!(top.len(), 10);
        let counts: Vec<u64> = top.iter().map(|c| c.message_count).collect();
        assert_eq!(counts, vec![9, 8, 7, 6, 5, 5, 5, 4, 3, 2]);
        // Equal lengths keep input order.
        assert_eq!(top[4].id, convos[1].id);
        assert_eq!(top[5].id, convos[5].id);
        assert_eq!(top[6].id, convos[11].id);
    }

    #[test]
    fn topics_sorted_with_default() {
        let mut convos: Vec<Conversation> = ["a", "a", "b", "a", "c", "b"]
            .iter()
            .map(|t| {
                let mut c = conversation(1, None);
                c.topic = Some(t.to_string());
                c
            })
            .collect();
        convos.push(conversation(1, None));
        let topics = topic_popularity(&convos);
        let names: Vec<&str> = topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "general"]);
        assert_eq!(topics[0].count, 3);
        assert_eq!(topics[0].share_pct, 42.9);
    }

    #[test]
    fn unique_users_ignores_missing_ids() {
        let a = conversation(1, None);
        let mut b = conversation(1, None);
        b.user_id = a.user_id;
        let mut c = conversation(1, None);
        c.user_id = None;
        assert_eq!(unique_users(&[a, b, c]), 1);
    }
}
