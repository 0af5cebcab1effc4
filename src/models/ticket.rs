//! Support tickets raised from the app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const KEYS: &'static [&'static str] = &["open", "in_progress", "resolved", "closed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Open and in-progress tickets still need staff attention.
    pub fn is_unresolved(status: Option<&str>) -> bool {
        matches!(status, Some("open") | Some("in_progress"))
    }
}

pub const PRIORITY_KEYS: &[&str] = &["high", "medium", "low"];

/// Ticket row joined with the reporter's profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportTicket {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
}

/// Optional filter for the tickets listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilters {
    pub status: Option<TicketStatus>,
}

impl TicketFilters {
    pub fn matches(&self, ticket: &SupportTicket) -> bool {
        self.status
            .map_or(true, |s| ticket.status.as_deref() == Some(s.as_str()))
    }
}

/// Partial ticket update: absent fields keep their stored value.
///
/// `admin_notes` is `None` when the key is absent and `Some(None)` when it is
/// sent as `null`, which clears the notes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicket {
    pub ticket_id: Uuid,
    pub status: Option<TicketStatus>,
    #[serde(rename = "admin_notes", default, deserialize_with = "present")]
    pub admin_notes: Option<Option<String>>,
}

impl UpdateTicket {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.admin_notes.is_none()
    }
}

/// Marks a key that was sent, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
