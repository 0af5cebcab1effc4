//! In-app feedback submissions. Immutable once submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Bug,
    FeatureRequest,
    General,
    Complaint,
}

impl FeedbackType {
    pub const KEYS: &'static [&'static str] = &["bug", "feature_request", "general", "complaint"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::FeatureRequest => "feature_request",
            Self::General => "general",
            Self::Complaint => "complaint",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub feedback_type: Option<String>,
    pub screen_name: Option<String>,
    pub message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackFilters {
    pub feedback_type: Option<FeedbackType>,
}

impl FeedbackFilters {
    pub fn matches(&self, feedback: &Feedback) -> bool {
        self.feedback_type
            .map_or(true, |t| feedback.feedback_type.as_deref() == Some(t.as_str()))
    }
}
