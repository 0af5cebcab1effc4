//! Per-page reports. Each is rebuilt from freshly fetched rows on every
//! request and never stored.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::business::{self, ConversationSummary, Revenue, TopicShare};
use super::grouping::GroupedCounts;
use super::scalar::{self, Cents};
use super::series::{BucketLabel, SeriesBuilder, TimeSeries};
use crate::models::activity::{Conversation, Round, SwingAnalysis};
use crate::models::feedback::{Feedback, FeedbackType};
use crate::models::profile::Profile;
use crate::models::ticket::{SupportTicket, TicketStatus, PRIORITY_KEYS};

pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;
/// Topics listed on the AI usage page.
pub const TOP_TOPICS: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewRows<'a> {
    pub profiles: &'a [Profile],
    pub rounds: &'a [Round],
    pub swings: &'a [SwingAnalysis],
    pub conversations: &'a [Conversation],
    pub tickets: &'a [SupportTicket],
    pub feedback: &'a [Feedback],
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewReport {
    pub total_users: u64,
    pub new_users_week: u64,
    pub tier_breakdown: GroupedCounts,
    pub active_subscribers: u64,
    pub estimated_mrr: Cents,
    pub total_rounds: u64,
    pub rounds_this_week: u64,
    pub total_swings: u64,
    pub swings_this_week: u64,
    pub total_conversations: u64,
    pub total_ai_messages: u64,
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub total_feedback: u64,
    pub feedback_this_week: u64,
    pub bug_reports: u64,
    /// New sign-ups per day over the last 30 days.
    pub user_growth: TimeSeries,
    /// Rounds and swings per day over the last 7 days.
    pub activity: TimeSeries,
}

pub fn overview(rows: OverviewRows<'_>, now: DateTime<Utc>) -> OverviewReport {
    let tiers = business::tier_breakdown(rows.profiles);
    let within_week = |ts| scalar::created_within(ts, now, WEEK_DAYS);

    let user_growth = SeriesBuilder::new(now, MONTH_DAYS as u32, BucketLabel::MonthDay)
        .count("users", rows.profiles.iter().map(|p| p.created_at))
        .build();
    let activity = SeriesBuilder::new(now, WEEK_DAYS as u32, BucketLabel::Weekday)
        .count("rounds", rows.rounds.iter().map(|r| r.created_at))
        .count("swings", rows.swings.iter().map(|s| s.created_at))
        .build();

    OverviewReport {
        total_users: scalar::count(rows.profiles),
        new_users_week: scalar::count_where(rows.profiles, |p| within_week(p.created_at)),
        active_subscribers: business::active_subscribers(rows.profiles),
        estimated_mrr: business::revenue(&tiers).mrr,
        tier_breakdown: tiers,
        total_rounds: scalar::count(rows.rounds),
        rounds_this_week: scalar::count_where(rows.rounds, |r| within_week(r.created_at)),
        total_swings: scalar::count(rows.swings),
        swings_this_week: scalar::count_where(rows.swings, |s| within_week(s.created_at)),
        total_conversations: scalar::count(rows.conversations),
        total_ai_messages: business::total_messages(rows.conversations),
        total_tickets: scalar::count(rows.tickets),
        open_tickets: scalar::count_where(rows.tickets, |t| {
            TicketStatus::is_unresolved(t.status.as_deref())
        }),
        total_feedback: scalar::count(rows.feedback),
        feedback_this_week: scalar::count_where(rows.feedback, |f| within_week(f.created_at)),
        bug_reports: scalar::count_where(rows.feedback, |f| {
            f.feedback_type.as_deref() == Some(FeedbackType::Bug.as_str())
        }),
        user_growth,
        activity,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionReport {
    pub total_profiles: u64,
    pub tier_breakdown: GroupedCounts,
    pub revenue: Revenue,
    pub conversion_rate: f64,
    pub active_subscribers: u64,
    pub trials_expiring_soon: Vec<Profile>,
    pub churn_30d: u64,
    pub recently_cancelled: Vec<Profile>,
}

pub fn subscriptions(profiles: &[Profile], now: DateTime<Utc>) -> SubscriptionReport {
    let tiers = business::tier_breakdown(profiles);
    let total = scalar::count(profiles);
    let recently_cancelled = business::recently_cancelled(profiles, now);

    SubscriptionReport {
        total_profiles: total,
        revenue: business::revenue(&tiers),
        conversion_rate: business::conversion_rate(&tiers, total),
        tier_breakdown: tiers,
        active_subscribers: business::active_subscribers(profiles),
        trials_expiring_soon: business::trials_expiring_soon(profiles, now),
        churn_30d: recently_cancelled.len() as u64,
        recently_cancelled,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AiUsageReport {
    pub total_conversations: u64,
    pub conversations_this_week: u64,
    pub total_messages: u64,
    pub avg_messages_per_conversation: f64,
    pub messages_this_week: u64,
    pub messages_this_month: u64,
    pub estimated_monthly_cost: Cents,
    pub unique_users: u64,
    pub topics: Vec<TopicShare>,
    /// Conversations and messages per day over the last 7 days.
    pub daily: TimeSeries,
    pub longest_conversations: Vec<ConversationSummary>,
}

pub fn ai_usage(conversations: &[Conversation], now: DateTime<Utc>) -> AiUsageReport {
    let messages_this_month = business::messages_within(conversations, now, MONTH_DAYS);

    let mut topics = business::topic_popularity(conversations);
    topics.truncate(TOP_TOPICS);

    let daily = SeriesBuilder::new(now, WEEK_DAYS as u32, BucketLabel::Weekday)
        .count("conversations", conversations.iter().map(|c| c.created_at))
        .sum(
            "messages",
            conversations.iter().map(|c| (c.created_at, c.message_count())),
        )
        .build();

    AiUsageReport {
        total_conversations: scalar::count(conversations),
        conversations_this_week: scalar::count_where(conversations, |c| {
            scalar::created_within(c.created_at, now, WEEK_DAYS)
        }),
        total_messages: business::total_messages(conversations),
        avg_messages_per_conversation: business::avg_messages_per_conversation(conversations),
        messages_this_week: business::messages_within(conversations, now, WEEK_DAYS),
        messages_this_month,
        estimated_monthly_cost: business::ai_cost_estimate(messages_this_month),
        unique_users: business::unique_users(conversations),
        topics,
        daily,
        longest_conversations: business::longest_conversations(conversations),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub total: u64,
    pub by_type: GroupedCounts,
    pub this_week: u64,
}

pub fn feedback(rows: &[Feedback], now: DateTime<Utc>) -> FeedbackReport {
    FeedbackReport {
        total: scalar::count(rows),
        by_type: GroupedCounts::tally(rows, |f| f.feedback_type.as_deref(), FeedbackType::KEYS),
        this_week: scalar::count_where(rows, |f| {
            scalar::created_within(f.created_at, now, WEEK_DAYS)
        }),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketReport {
    pub total: u64,
    pub by_status: GroupedCounts,
    pub by_priority: GroupedCounts,
    pub open: u64,
}

pub fn tickets(rows: &[SupportTicket]) -> TicketReport {
    TicketReport {
        total: scalar::count(rows),
        by_status: GroupedCounts::tally(rows, |t| t.status.as_deref(), TicketStatus::KEYS),
        by_priority: GroupedCounts::tally(rows, |t| t.priority.as_deref(), PRIORITY_KEYS),
        open: scalar::count_where(rows, |t| TicketStatus::is_unresolved(t.status.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::models::activity::fixtures::conversation;
    use crate::models::profile::fixtures::profile;

    fn ticket(status: Option<&str>, priority: Option<&str>) -> SupportTicket {
        SupportTicket {
            id: Uuid::new_v4(),
            user_id: None,
            subject: Some("App crashes".to_string()),
            description: None,
            status: status.map(str::to_string),
            priority: priority.map(str::to_string),
            admin_notes: None,
            created_at: None,
            reporter_name: None,
            reporter_email: None,
        }
    }

    fn feedback_row(kind: &str, created_at: Option<DateTime<Utc>>) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            user_id: None,
            feedback_type: Some(kind.to_string()),
            screen_name: Some("home".to_string()),
            message: Some("hello".to_string()),
            created_at,
            reporter_name: None,
            reporter_email: None,
        }
    }

    #[test]
    fn overview_of_nothing_is_all_zero() {
        let report = overview(OverviewRows::default(), Utc::now());
        assert_eq!(report.total_users, 0);
        assert_eq!(report.estimated_mrr, Cents(0));
        assert_eq!(report.tier_breakdown.keys(), vec!["free", "premium", "pro"]);
        assert_eq!(report.user_growth.buckets.len(), 30);
        assert_eq!(report.activity.buckets.len(), 7);
        assert_eq!(report.activity.metrics, vec!["rounds", "swings"]);
    }

    #[test]
    fn overview_counts() {
        let now = Utc::now();
        let mut fresh = profile(Some("premium"), Some("active"));
        fresh.created_at = Some(now - Duration::hours(2));
        let mut old = profile(Some("free"), Some("active"));
        old.created_at = Some(now - Duration::days(60));
        let profiles = vec![fresh, old, profile(Some("pro"), None)];

        let rounds = vec![Round {
            id: Uuid::new_v4(),
            user_id: None,
            total_score: Some(82),
            date_played: None,
            created_at: Some(now - Duration::days(1)),
        }];
        let swings = vec![
            SwingAnalysis {
                id: Uuid::new_v4(),
                user_id: None,
                created_at: Some(now - Duration::days(9)),
            },
            SwingAnalysis {
                id: Uuid::new_v4(),
                user_id: None,
                created_at: None,
            },
        ];
        let conversations = vec![conversation(3, None), conversation(2, None)];
        let tickets = vec![
            ticket(Some("open"), Some("high")),
            ticket(Some("in_progress"), None),
            ticket(Some("closed"), Some("low")),
        ];
        let feedback = vec![
            feedback_row("bug", Some(now - Duration::days(2))),
            feedback_row("bug", Some(now - Duration::days(40))),
            feedback_row("general", Some(now - Duration::days(40))),
        ];

        let report = overview(
            OverviewRows {
                profiles: &profiles,
                rounds: &rounds,
                swings: &swings,
                conversations: &conversations,
                tickets: &tickets,
                feedback: &feedback,
            },
            now,
        );

        assert_eq!(report.total_users, 3);
        assert_eq!(report.new_users_week, 1);
        assert_eq!(report.active_subscribers, 1);
        assert_eq!(report.estimated_mrr, Cents(1299 + 2499));
        assert_eq!(report.total_rounds, 1);
        assert_eq!(report.rounds_this_week, 1);
        assert_eq!(report.total_swings, 2);
        assert_eq!(report.swings_this_week, 0);
        assert_eq!(report.total_conversations, 2);
        assert_eq!(report.total_ai_messages, 5);
        assert_eq!(report.total_tickets, 3);
        assert_eq!(report.open_tickets, 2);
        assert_eq!(report.total_feedback, 3);
        assert_eq!(report.feedback_this_week, 1);
        assert_eq!(report.bug_reports, 2);
        assert_eq!(report.user_growth.column("users").unwrap().iter().sum::<u64>(), 1);
    }

    #[test]
    fn subscription_report() {
        let mut profiles = Vec::new();
        profiles.extend((0..10).map(|_| profile(Some("free"), Some("active"))));
        profiles.extend((0..3).map(|_| profile(Some("premium"), Some("active"))));
        profiles.extend((0..2).map(|_| profile(Some("pro"), Some("active"))));

        let report = subscriptions(&profiles, Utc::now());
        assert_eq!(report.total_profiles, 15);
        assert_eq!(report.revenue.mrr.dollars(), 88.95);
        assert_eq!(report.revenue.arr.dollars(), 1067.40);
        assert_eq!(report.conversion_rate, 33.3);
        assert_eq!(report.active_subscribers, 5);
        assert_eq!(report.churn_30d, 0);
    }

    #[test]
    fn ai_usage_report() {
        let now = Utc::now();
        let convos: Vec<Conversation> = (0..12)
            .map(|i| {
                let mut c = conversation(i, Some(now - Duration::days(i as i64 * 3)));
                c.topic = Some(format!("topic_{}", i % 10));
                c
            })
            .collect();

        let report = ai_usage(&convos, now);
        assert_eq!(report.total_conversations, 12);
        assert_eq!(report.total_messages, (0..12).sum::<u64>());
        assert_eq!(report.topics.len(), TOP_TOPICS);
        assert_eq!(report.daily.buckets.len(), 7);
        assert_eq!(report.longest_conversations.len(), 10);
        assert_eq!(report.longest_conversations[0].message_count, 11);
        // created 0, 3 and 6 days ago
        assert_eq!(report.conversations_this_week, 3);
        assert_eq!(report.messages_this_week, 0 + 1 + 2);
        assert_eq!(
            report.estimated_monthly_cost,
            business::ai_cost_estimate(report.messages_this_month)
        );
    }

    #[test]
    fn feedback_and_ticket_tallies() {
        let now = Utc::now();
        let rows = vec![
            feedback_row("bug", Some(now)),
            feedback_row("bug", Some(now - Duration::days(20))),
            feedback_row("praise", None),
        ];
        let report = feedback(&rows, now);
        assert_eq!(report.total, 3);
        assert_eq!(report.this_week, 1);
        assert_eq!(
            report.by_type.keys(),
            vec!["bug", "feature_request", "general", "complaint", "praise"]
        );
        assert_eq!(report.by_type.get("bug"), 2);

        let report = tickets(&[
            ticket(Some("open"), Some("medium")),
            ticket(Some("resolved"), Some("medium")),
            ticket(None, None),
        ]);
        assert_eq!(report.total, 3);
        assert_eq!(report.open, 1);
        assert_eq!(report.by_status.get("resolved"), 1);
        assert_eq!(report.by_priority.get("medium"), 2);
        assert_eq!(report.by_status.total(), 2);
    }
}
