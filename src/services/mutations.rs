//! Single-record writes keyed by `action`.
//!
//! Each mutation touches one row of one table. There is no cross-entity
//! transaction and no concurrency check: the last write wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::store::Store;
use crate::db::retry::{with_retry, RetryPolicy};
use crate::errors::AppError;
use crate::models::content::{
    Drill, SaveDrill, SaveTip, Tip, WriteMode, DEFAULT_DIFFICULTY, DEFAULT_DURATION_MINUTES,
};
use crate::models::profile::{Profile, UpdateSubscription};
use crate::models::ticket::{SupportTicket, UpdateTicket};

/// Actions accepted by the write endpoint.
pub const ACTIONS: &[&str] = &[
    "update_subscription",
    "update_ticket",
    "save_tip",
    "delete_tip",
    "save_drill",
    "delete_drill",
];

const TIP_RETURNING: &str = "RETURNING id, title, body, category, display_order, is_published, created_at";

const DRILL_RETURNING: &str = "RETURNING id, title, description, category, difficulty, duration_minutes, \
     display_order, is_published, is_premium, created_at";

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Mutation {
    UpdateSubscription(UpdateSubscription),
    UpdateTicket(UpdateTicket),
    SaveTip {
        tip: SaveTip,
    },
    DeleteTip {
        #[serde(rename = "tipId")]
        tip_id: Uuid,
    },
    SaveDrill {
        drill: SaveDrill,
    },
    DeleteDrill {
        #[serde(rename = "drillId")]
        drill_id: Uuid,
    },
}

impl Mutation {
    /// Parse a request body. An unknown or missing `action` is reported as
    /// such; a known action with bad fields is a validation error.
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        let action = body
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !ACTIONS.contains(&action) {
            return Err(AppError::InvalidAction(action.to_string()));
        }

        let mutation: Mutation = serde_json::from_value(body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;
        mutation.validate()?;
        Ok(mutation)
    }

    pub fn action(&self) -> &'static str {
        match self {
            Mutation::UpdateSubscription(_) => "update_subscription",
            Mutation::UpdateTicket(_) => "update_ticket",
            Mutation::SaveTip { .. } => "save_tip",
            Mutation::DeleteTip { .. } => "delete_tip",
            Mutation::SaveDrill { .. } => "save_drill",
            Mutation::DeleteDrill { .. } => "delete_drill",
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        let result = match self {
            Mutation::UpdateTicket(update) if update.is_empty() => {
                return Err(AppError::Validation(
                    "update_ticket needs status or admin_notes".to_string(),
                ));
            }
            Mutation::SaveTip { tip } => tip.validate(),
            Mutation::SaveDrill { drill } => drill.validate(),
            _ => Ok(()),
        };
        result.map_err(|e| AppError::Validation(e.to_string()))
    }
}

/// What a successful mutation hands back to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationResult {
    Profile(Profile),
    Ticket(SupportTicket),
    Tip(Tip),
    Drill(Drill),
    Deleted(Uuid),
}

/// Apply one mutation.
pub async fn apply(store: Store<'_>, mutation: Mutation) -> Result<MutationResult, AppError> {
    let action = mutation.action();
    let result = match mutation {
        Mutation::UpdateSubscription(update) => {
            MutationResult::Profile(update_subscription(store, &update).await?)
        }
        Mutation::UpdateTicket(update) => MutationResult::Ticket(update_ticket(store, &update).await?),
        Mutation::SaveTip { tip } => MutationResult::Tip(save_tip(store, &tip).await?),
        Mutation::DeleteTip { tip_id } => {
            delete_by_id(store, "daily_tips", tip_id).await?;
            MutationResult::Deleted(tip_id)
        }
        Mutation::SaveDrill { drill } => MutationResult::Drill(save_drill(store, &drill).await?),
        Mutation::DeleteDrill { drill_id } => {
            delete_by_id(store, "practice_drills", drill_id).await?;
            MutationResult::Deleted(drill_id)
        }
    };
    tracing::info!(action, "Mutation applied");
    Ok(result)
}

/// Inserts are not idempotent, so they get exactly one attempt.
fn single_attempt(policy: &RetryPolicy) -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        ..*policy
    }
}

pub async fn update_subscription(
    store: Store<'_>,
    update: &UpdateSubscription,
) -> Result<Profile, AppError> {
    with_retry(store.retry(), "profiles", || {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET subscription_tier = $1, subscription_status = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, display_name, email, subscription_tier, subscription_status,
                      trial_end_date, created_at, updated_at
            "#,
        )
        .bind(update.tier.as_str())
        .bind(update.status.as_str())
        .bind(update.user_id)
        .fetch_optional(store.pool())
    })
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", update.user_id)))
}

/// Change only the provided ticket fields.
pub async fn update_ticket(store: Store<'_>, update: &UpdateTicket) -> Result<SupportTicket, AppError> {
    with_retry(store.retry(), "tickets", || {
        sqlx::query_as::<_, SupportTicket>(
            r#"
            WITH t AS (
                UPDATE support_tickets
                SET status = COALESCE($1, status),
                    admin_notes = CASE WHEN $4 THEN $2 ELSE admin_notes END
                WHERE id = $3
                RETURNING *
            )
            SELECT t.id, t.user_id, t.subject, t.description, t.status, t.priority,
                   t.admin_notes, t.created_at,
                   p.display_name AS reporter_name, p.email AS reporter_email
            FROM t LEFT JOIN profiles p ON p.id = t.user_id
            "#,
        )
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.admin_notes.as_ref().and_then(|n| n.as_deref()))
        .bind(update.ticket_id)
        .bind(update.admin_notes.is_some())
        .fetch_optional(store.pool())
    })
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", update.ticket_id)))
}

/// Insert a tip without an id, otherwise rewrite the tip with that id.
pub async fn save_tip(store: Store<'_>, tip: &SaveTip) -> Result<Tip, AppError> {
    match tip.write_mode() {
        WriteMode::Insert => {
            let sql = format!(
                "INSERT INTO daily_tips (title, body, category, display_order, is_published) \
                 VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, true)) {TIP_RETURNING}"
            );
            let saved = with_retry(&single_attempt(store.retry()), "tips", || {
                sqlx::query_as::<_, Tip>(&sql)
                    .bind(&tip.title)
                    .bind(&tip.body)
                    .bind(&tip.category)
                    .bind(tip.display_order)
                    .bind(tip.is_published)
                    .fetch_one(store.pool())
            })
            .await?;
            tracing::info!(tip_id = %saved.id, "Tip created");
            Ok(saved)
        }
        WriteMode::Update(id) => {
            let sql = format!(
                "UPDATE daily_tips SET title = $2, body = $3, category = $4, \
                 display_order = COALESCE($5, display_order), \
                 is_published = COALESCE($6, is_published) \
                 WHERE id = $1 {TIP_RETURNING}"
            );
            with_retry(store.retry(), "tips", || {
                sqlx::query_as::<_, Tip>(&sql)
                    .bind(id)
                    .bind(&tip.title)
                    .bind(&tip.body)
                    .bind(&tip.category)
                    .bind(tip.display_order)
                    .bind(tip.is_published)
                    .fetch_optional(store.pool())
            })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tip {id} not found")))
        }
    }
}

/// Insert a drill without an id, otherwise rewrite the drill with that id.
pub async fn save_drill(store: Store<'_>, drill: &SaveDrill) -> Result<Drill, AppError> {
    match drill.write_mode() {
        WriteMode::Insert => {
            let sql = format!(
                "INSERT INTO practice_drills \
                 (title, description, category, difficulty, duration_minutes, display_order, is_published, is_premium) \
                 VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), COALESCE($7, true), COALESCE($8, false)) \
                 {DRILL_RETURNING}"
            );
            let difficulty = drill.difficulty.as_deref().unwrap_or(DEFAULT_DIFFICULTY);
            let duration = drill.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
            let saved = with_retry(&single_attempt(store.retry()), "drills", || {
                sqlx::query_as::<_, Drill>(&sql)
                    .bind(&drill.title)
                    .bind(&drill.description)
                    .bind(&drill.category)
                    .bind(difficulty)
                    .bind(duration)
                    .bind(drill.display_order)
                    .bind(drill.is_published)
                    .bind(drill.is_premium)
                    .fetch_one(store.pool())
            })
            .await?;
            tracing::info!(drill_id = %saved.id, "Drill created");
            Ok(saved)
        }
        WriteMode::Update(id) => {
            let sql = format!(
                "UPDATE practice_drills SET title = $2, description = $3, category = $4, \
                 difficulty = COALESCE($5, difficulty), \
                 duration_minutes = COALESCE($6, duration_minutes), \
                 display_order = COALESCE($7, display_order), \
                 is_published = COALESCE($8, is_published), \
                 is_premium = COALESCE($9, is_premium) \
                 WHERE id = $1 {DRILL_RETURNING}"
            );
            with_retry(store.retry(), "drills", || {
                sqlx::query_as::<_, Drill>(&sql)
                    .bind(id)
                    .bind(&drill.title)
                    .bind(&drill.description)
                    .bind(&drill.category)
                    .bind(drill.difficulty.as_deref())
                    .bind(drill.duration_minutes)
                    .bind(drill.display_order)
                    .bind(drill.is_published)
                    .bind(drill.is_premium)
                    .fetch_optional(store.pool())
            })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Drill {id} not found")))
        }
    }
}

/// Delete exactly one content row. `table` is one of the fixed content tables.
async fn delete_by_id(store: Store<'_>, table: &'static str, id: Uuid) -> Result<(), AppError> {
    let sql = format!("DELETE FROM {table} WHERE id = $1");
    let result = with_retry(store.retry(), table, || {
        sqlx::query(&sql).bind(id).execute(store.pool())
    })
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("No row {id} in {table}")));
    }
    tracing::info!(table, %id, "Content deleted");
    Ok(())
}
