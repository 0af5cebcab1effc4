//! Read dispatch: one `type` selector, one handler per kind of record set.
//!
//! Multi-source views fetch concurrently and report each source on its own,
//! so one failing collection never hides the ones that loaded.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::{Store, AI_ANALYTICS_LIMIT};
use crate::db::StoreError;
use crate::errors::{ApiError, AppError};
use crate::metrics::grouping::tally_by_id;
use crate::metrics::reports::OverviewRows;
use crate::models::activity::{Conversation, Round, SwingAnalysis};
use crate::models::content::{Drill, Tip};
use crate::models::feedback::{Feedback, FeedbackFilters, FeedbackType};
use crate::models::profile::{
    Profile, SubscriptionFilter, SubscriptionTier, UserFilters, UserSummary,
};
use crate::models::ticket::{SupportTicket, TicketFilters, TicketStatus};

/// Record set selected by the read endpoint's `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Overview,
    Users,
    UserDetail,
    Subscriptions,
    Tickets,
    Feedback,
    AiAnalytics,
    Tips,
    Drills,
}

impl FromStr for DataKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "overview" => Self::Overview,
            "users" => Self::Users,
            "user_detail" => Self::UserDetail,
            "subscriptions" => Self::Subscriptions,
            "tickets" => Self::Tickets,
            "feedback" => Self::Feedback,
            "ai_analytics" => Self::AiAnalytics,
            "tips" => Self::Tips,
            "drills" => Self::Drills,
            other => return Err(AppError::InvalidType(other.to_string())),
        })
    }
}

/// Query string of `GET /api/v1/data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
    pub search: Option<String>,
    pub tier: Option<SubscriptionTier>,
    pub filter: Option<SubscriptionFilter>,
    pub status: Option<TicketStatus>,
    pub feedback_type: Option<FeedbackType>,
}

impl DataQuery {
    pub fn kind(&self) -> Result<DataKind, AppError> {
        self.kind.as_deref().unwrap_or_default().parse()
    }
}

/// Outcome of one source in a multi-source fetch.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Sourced<T> {
    Ok { data: T },
    Failed { error: ApiError },
}

impl<T> Sourced<T> {
    pub fn from_result(source: &'static str, result: Result<T, StoreError>) -> Self {
        match result {
            Ok(data) => Sourced::Ok { data },
            Err(e) => {
                tracing::warn!(source, kind = ?e.kind, error = %e.message, "Source failed to load");
                Sourced::Failed {
                    error: ApiError::from(&e),
                }
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Sourced::Ok { data } => Some(data),
            Sourced::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Sourced::Ok { .. } => None,
            Sourced::Failed { error } => Some(error),
        }
    }
}

/// Rows of a source, empty when it failed.
fn rows_of<T>(sourced: &Sourced<Vec<T>>) -> &[T] {
    sourced.data().map(Vec::as_slice).unwrap_or(&[])
}

/// A source that could not be loaded.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source: &'static str,
    pub error: ApiError,
}

fn collect_failures(sources: &[(&'static str, Option<&ApiError>)]) -> Vec<SourceFailure> {
    sources
        .iter()
        .filter_map(|&(source, error)| {
            error.map(|e| SourceFailure {
                source,
                error: e.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct OverviewData {
    pub profiles: Sourced<Vec<Profile>>,
    pub rounds: Sourced<Vec<Round>>,
    pub swings: Sourced<Vec<SwingAnalysis>>,
    pub conversations: Sourced<Vec<Conversation>>,
    pub tickets: Sourced<Vec<SupportTicket>>,
    pub feedback: Sourced<Vec<Feedback>>,
}

impl OverviewData {
    /// Rows for metric derivation; failed sources contribute nothing.
    pub fn rows(&self) -> OverviewRows<'_> {
        OverviewRows {
            profiles: rows_of(&self.profiles),
            rounds: rows_of(&self.rounds),
            swings: rows_of(&self.swings),
            conversations: rows_of(&self.conversations),
            tickets: rows_of(&self.tickets),
            feedback: rows_of(&self.feedback),
        }
    }

    pub fn failures(&self) -> Vec<SourceFailure> {
        collect_failures(&[
            ("profiles", self.profiles.error()),
            ("rounds", self.rounds.error()),
            ("swings", self.swings.error()),
            ("conversations", self.conversations.error()),
            ("tickets", self.tickets.error()),
            ("feedback", self.feedback.error()),
        ])
    }
}

#[derive(Debug, Serialize)]
pub struct UserDetailData {
    pub profile: Profile,
    pub rounds: Sourced<Vec<Round>>,
    pub swings: Sourced<Vec<SwingAnalysis>>,
    pub conversations: Sourced<Vec<Conversation>>,
    pub tickets: Sourced<Vec<SupportTicket>>,
}

impl UserDetailData {
    pub fn failures(&self) -> Vec<SourceFailure> {
        collect_failures(&[
            ("rounds", self.rounds.error()),
            ("swings", self.swings.error()),
            ("conversations", self.conversations.error()),
            ("tickets", self.tickets.error()),
        ])
    }
}

/// Response body of the read endpoint, keyed the way the dashboard reads it.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DataPayload {
    Overview(OverviewData),
    Users { users: Vec<UserSummary> },
    UserDetail(Box<UserDetailData>),
    Subscriptions { subscriptions: Vec<Profile> },
    Tickets { tickets: Vec<SupportTicket> },
    Feedback { feedback: Vec<Feedback> },
    AiAnalytics { conversations: Vec<Conversation> },
    Tips { tips: Vec<Tip> },
    Drills { drills: Vec<Drill> },
}

/// Fetch the record set for `kind`.
pub async fn load(store: Store<'_>, kind: DataKind, query: &DataQuery) -> Result<DataPayload, AppError> {
    let payload = match kind {
        DataKind::Overview => DataPayload::Overview(load_overview(store).await),
        DataKind::Users => {
            let filters = UserFilters {
                search: query.search.clone(),
                tier: query.tier,
            };
            DataPayload::Users {
                users: load_users(store, &filters).await?,
            }
        }
        DataKind::UserDetail => {
            let user_id = query
                .user_id
                .ok_or_else(|| AppError::Validation("userId is required".to_string()))?;
            DataPayload::UserDetail(Box::new(load_user_detail(store, user_id).await?))
        }
        DataKind::Subscriptions => {
            let filter = query.filter.unwrap_or_default();
            let mut subscriptions = store.profiles().await?;
            subscriptions.retain(|p| filter.matches(p));
            DataPayload::Subscriptions { subscriptions }
        }
        DataKind::Tickets => {
            let filters = TicketFilters {
                status: query.status,
            };
            let mut tickets = store.tickets().await?;
            tickets.retain(|t| filters.matches(t));
            DataPayload::Tickets { tickets }
        }
        DataKind::Feedback => {
            let filters = FeedbackFilters {
                feedback_type: query.feedback_type,
            };
            let mut feedback = store.feedback().await?;
            feedback.retain(|f| filters.matches(f));
            DataPayload::Feedback { feedback }
        }
        DataKind::AiAnalytics => DataPayload::AiAnalytics {
            conversations: store.conversations(Some(AI_ANALYTICS_LIMIT)).await?,
        },
        DataKind::Tips => DataPayload::Tips {
            tips: store.tips().await?,
        },
        DataKind::Drills => DataPayload::Drills {
            drills: store.drills().await?,
        },
    };
    Ok(payload)
}

/// All six overview sources, fetched concurrently. Never fails as a whole.
pub async fn load_overview(store: Store<'_>) -> OverviewData {
    let (profiles, rounds, swings, conversations, tickets, feedback) = tokio::join!(
        store.profiles(),
        store.rounds(),
        store.swings(),
        store.conversations(None),
        store.tickets(),
        store.feedback(),
    );

    let data = OverviewData {
        profiles: Sourced::from_result("profiles", profiles),
        rounds: Sourced::from_result("rounds", rounds),
        swings: Sourced::from_result("swings", swings),
        conversations: Sourced::from_result("conversations", conversations),
        tickets: Sourced::from_result("tickets", tickets),
        feedback: Sourced::from_result("feedback", feedback),
    };

    let failed = data.failures().len();
    if failed > 0 {
        tracing::warn!(failed, "Overview loaded with partial data");
    }
    data
}

/// Profiles with per-user round and swing counts.
pub async fn load_users(store: Store<'_>, filters: &UserFilters) -> Result<Vec<UserSummary>, AppError> {
    let (profiles, rounds, swings) =
        tokio::try_join!(store.profiles(), store.rounds(), store.swings())?;

    let rounds_by_user = tally_by_id(&rounds, |r| r.user_id);
    let swings_by_user = tally_by_id(&swings, |s| s.user_id);

    Ok(profiles
        .into_iter()
        .filter(|p| filters.matches(p))
        .map(|profile| UserSummary {
            rounds_count: rounds_by_user.get(&profile.id).copied().unwrap_or(0),
            swings_count: swings_by_user.get(&profile.id).copied().unwrap_or(0),
            profile,
        })
        .collect())
}

/// One user's profile and recent activity. Only a missing or unreadable
/// profile fails the request; the other sources are reported individually.
pub async fn load_user_detail(store: Store<'_>, user_id: Uuid) -> Result<UserDetailData, AppError> {
    let (profile, rounds, swings, conversations, tickets) = tokio::join!(
        store.profile(user_id),
        store.rounds_for_user(user_id),
        store.swings_for_user(user_id),
        store.conversations_for_user(user_id),
        store.tickets_for_user(user_id),
    );

    let profile = profile?.ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let detail = UserDetailData {
        profile,
        rounds: Sourced::from_result("rounds", rounds),
        swings: Sourced::from_result("swings", swings),
        conversations: Sourced::from_result("conversations", conversations),
        tickets: Sourced::from_result("tickets", tickets),
    };

    let failed = detail.failures().len();
    if failed > 0 {
        tracing::warn!(%user_id, failed, "User detail loaded with partial data");
    }
    Ok(detail)
}
