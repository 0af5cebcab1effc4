//! In-app activity rows: golf rounds, swing captures and AI coach conversations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Topic assigned to conversations stored without one.
pub const DEFAULT_TOPIC: &str = "general";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Round {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_score: Option<i32>,
    pub date_played: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SwingAnalysis {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

/// AI coach session. `messages` is kept as raw JSON; only its length matters here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub topic: Option<String>,
    pub messages: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Number of messages; 0 when the column is null or not an array.
    pub fn message_count(&self) -> u64 {
        self.messages
            .as_ref()
            .and_then(serde_json::Value::as_array)
            .map_or(0, |m| m.len() as u64)
    }

    pub fn topic_or_default(&self) -> &str {
        match self.topic.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => DEFAULT_TOPIC,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn conversation(messages: usize, created_at: Option<DateTime<Utc>>) -> Conversation {
        let msgs: Vec<serde_json::Value> = (0..messages)
            .map(|i| serde_json::json!({ "role": "user", "content": format!("msg {i}") }))
            .collect();
        Conversation {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            topic: None,
            messages: Some(serde_json::Value::Array(msgs)),
            created_at,
        }
    }
}
