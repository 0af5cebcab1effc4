//! Read queries against the store's collections.
//!
//! Every query goes through [`with_retry`], so callers see a classified
//! [`StoreError`] after a bounded number of attempts.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::retry::{with_retry, RetryPolicy};
use crate::db::StoreError;
use crate::models::activity::{Conversation, Round, SwingAnalysis};
use crate::models::content::{Drill, Tip};
use crate::models::feedback::Feedback;
use crate::models::profile::Profile;
use crate::models::ticket::SupportTicket;

/// Most recent conversations shown on the AI usage page.
pub const AI_ANALYTICS_LIMIT: i64 = 200;
pub const USER_DETAIL_ROUNDS: i64 = 20;
pub const USER_DETAIL_SWINGS: i64 = 20;
pub const USER_DETAIL_CONVERSATIONS: i64 = 10;

const PROFILE_COLUMNS: &str = "SELECT id, display_name, email, subscription_tier, subscription_status, \
     trial_end_date, created_at, updated_at FROM profiles";

const TICKET_COLUMNS: &str = "SELECT t.id, t.user_id, t.subject, t.description, t.status, t.priority, \
     t.admin_notes, t.created_at, p.display_name AS reporter_name, p.email AS reporter_email \
     FROM support_tickets t LEFT JOIN profiles p ON p.id = t.user_id";

const FEEDBACK_COLUMNS: &str = "SELECT f.id, f.user_id, f.feedback_type, f.screen_name, f.message, \
     f.created_at, p.display_name AS reporter_name, p.email AS reporter_email \
     FROM app_feedback f LEFT JOIN profiles p ON p.id = f.user_id";

/// Borrowed pool plus the retry policy every read uses.
#[derive(Debug, Clone, Copy)]
pub struct Store<'a> {
    pool: &'a PgPool,
    retry: RetryPolicy,
}

impl<'a> Store<'a> {
    pub fn new(pool: &'a PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    pub fn pool(&self) -> &'a PgPool {
        self.pool
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// All profiles, newest first.
    pub async fn profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let sql = format!("{PROFILE_COLUMNS} ORDER BY created_at DESC NULLS LAST");
        with_retry(&self.retry, "profiles", || {
            sqlx::query_as::<_, Profile>(&sql).fetch_all(self.pool)
        })
        .await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let sql = format!("{PROFILE_COLUMNS} WHERE id = $1");
        with_retry(&self.retry, "profile", || {
            sqlx::query_as::<_, Profile>(&sql)
                .bind(user_id)
                .fetch_optional(self.pool)
        })
        .await
    }

    pub async fn rounds(&self) -> Result<Vec<Round>, StoreError> {
        with_retry(&self.retry, "rounds", || {
            sqlx::query_as::<_, Round>(
                "SELECT id, user_id, total_score, date_played, created_at FROM rounds",
            )
            .fetch_all(self.pool)
        })
        .await
    }

    /// A user's latest rounds by date played.
    pub async fn rounds_for_user(&self, user_id: Uuid) -> Result<Vec<Round>, StoreError> {
        with_retry(&self.retry, "rounds", || {
            sqlx::query_as::<_, Round>(
                r#"
                SELECT id, user_id, total_score, date_played, created_at
                FROM rounds
                WHERE user_id = $1
                ORDER BY date_played DESC NULLS LAST
                LIMIT $2
                "#,
            )
            .bind(user_id)
            .bind(USER_DETAIL_ROUNDS)
            .fetch_all(self.pool)
        })
        .await
    }

    pub async fn swings(&self) -> Result<Vec<SwingAnalysis>, StoreError> {
        with_retry(&self.retry, "swings", || {
            sqlx::query_as::<_, SwingAnalysis>("SELECT id, user_id, created_at FROM swing_analyses")
                .fetch_all(self.pool)
        })
        .await
    }

    pub async fn swings_for_user(&self, user_id: Uuid) -> Result<Vec<SwingAnalysis>, StoreError> {
        with_retry(&self.retry, "swings", || {
            sqlx::query_as::<_, SwingAnalysis>(
                r#"
                SELECT id, user_id, created_at
                FROM swing_analyses
                WHERE user_id = $1
                ORDER BY created_at DESC NULLS LAST
                LIMIT $2
                "#,
            )
            .bind(user_id)
            .bind(USER_DETAIL_SWINGS)
            .fetch_all(self.pool)
        })
        .await
    }

    /// Conversations newest first; `limit = None` returns all of them.
    pub async fn conversations(&self, limit: Option<i64>) -> Result<Vec<Conversation>, StoreError> {
        with_retry(&self.retry, "conversations", || {
            sqlx::query_as::<_, Conversation>(
                r#"
                SELECT id, user_id, topic, messages, created_at
                FROM ai_conversations
                ORDER BY created_at DESC NULLS LAST
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(self.pool)
        })
        .await
    }

    pub async fn conversations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Conversation>, StoreError> {
        with_retry(&self.retry, "conversations", || {
            sqlx::query_as::<_, Conversation>(
                r#"
                SELECT id, user_id, topic, messages, created_at
                FROM ai_conversations
                WHERE user_id = $1
                ORDER BY created_at DESC NULLS LAST
                LIMIT $2
                "#,
            )
            .bind(user_id)
            .bind(USER_DETAIL_CONVERSATIONS)
            .fetch_all(self.pool)
        })
        .await
    }

    /// Tickets newest first, with the reporter's name and email.
    pub async fn tickets(&self) -> Result<Vec<SupportTicket>, StoreError> {
        let sql = format!("{TICKET_COLUMNS} ORDER BY t.created_at DESC NULLS LAST");
        with_retry(&self.retry, "tickets", || {
            sqlx::query_as::<_, SupportTicket>(&sql).fetch_all(self.pool)
        })
        .await
    }

    pub async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<SupportTicket>, StoreError> {
        let sql =
            format!("{TICKET_COLUMNS} WHERE t.user_id = $1 ORDER BY t.created_at DESC NULLS LAST");
        with_retry(&self.retry, "tickets", || {
            sqlx::query_as::<_, SupportTicket>(&sql)
                .bind(user_id)
                .fetch_all(self.pool)
        })
        .await
    }

    /// Feedback newest first, with the reporter's name and email.
    pub async fn feedback(&self) -> Result<Vec<Feedback>, StoreError> {
        let sql = format!("{FEEDBACK_COLUMNS} ORDER BY f.created_at DESC NULLS LAST");
        with_retry(&self.retry, "feedback", || {
            sqlx::query_as::<_, Feedback>(&sql).fetch_all(self.pool)
        })
        .await
    }

    pub async fn tips(&self) -> Result<Vec<Tip>, StoreError> {
        with_retry(&self.retry, "tips", || {
            sqlx::query_as::<_, Tip>(
                r#"
                SELECT id, title, body, category, display_order, is_published, created_at
                FROM daily_tips
                ORDER BY display_order, created_at
                "#,
            )
            .fetch_all(self.pool)
        })
        .await
    }

    pub async fn drills(&self) -> Result<Vec<Drill>, StoreError> {
        with_retry(&self.retry, "drills", || {
            sqlx::query_as::<_, Drill>(
                r#"
                SELECT id, title, description, category, difficulty, duration_minutes,
                       display_order, is_published, is_premium, created_at
                FROM practice_drills
                ORDER BY display_order, created_at
                "#,
            )
            .fetch_all(self.pool)
        })
        .await
    }
}
