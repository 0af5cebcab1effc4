//! Admin-authored content: daily tips and practice drills.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const TIP_CATEGORIES: &[&str] = &[
    "full_swing",
    "short_game",
    "putting",
    "mental_game",
    "course_management",
    "fitness",
    "equipment",
    "rules",
];

pub const DRILL_CATEGORIES: &[&str] = &["full_swing", "short_game", "putting", "mental_game"];

pub const DIFFICULTIES: &[&str] = &["beginner", "intermediate", "advanced"];

pub const DEFAULT_DIFFICULTY: &str = "beginner";
pub const DEFAULT_DURATION_MINUTES: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tip {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub category: String,
    pub display_order: i32,
    pub is_published: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Drill {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub duration_minutes: i32,
    pub display_order: i32,
    pub is_published: bool,
    pub is_premium: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Whether a save creates a new row or rewrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Update(Uuid),
}

impl WriteMode {
    fn for_id(id: Option<Uuid>) -> Self {
        id.map_or(Self::Insert, Self::Update)
    }
}

/// Tip as submitted by the content editor. Without an `id` it is created.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveTip {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    #[validate(custom(function = "validate_tip_category"))]
    pub category: String,
    pub display_order: Option<i32>,
    pub is_published: Option<bool>,
}

impl SaveTip {
    pub fn write_mode(&self) -> WriteMode {
        WriteMode::for_id(self.id)
    }
}

/// Drill as submitted by the content editor. Without an `id` it is created.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveDrill {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(custom(function = "validate_drill_category"))]
    pub category: String,
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 240))]
    pub duration_minutes: Option<i32>,
    pub display_order: Option<i32>,
    pub is_published: Option<bool>,
    pub is_premium: Option<bool>,
}

impl SaveDrill {
    pub fn write_mode(&self) -> WriteMode {
        WriteMode::for_id(self.id)
    }
}

fn one_of(value: &str, allowed: &[&str], code: &'static str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(code))
    }
}

fn validate_tip_category(category: &str) -> Result<(), ValidationError> {
    one_of(category, TIP_CATEGORIES, "unknown_tip_category")
}

fn validate_drill_category(category: &str) -> Result<(), ValidationError> {
    one_of(category, DRILL_CATEGORIES, "unknown_drill_category")
}

fn validate_difficulty(difficulty: &str) -> Result<(), ValidationError> {
    one_of(difficulty, DIFFICULTIES, "unknown_difficulty")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip(category: &str) -> SaveTip {
        SaveTip {
            id: None,
            title: "Keep your head still".to_string(),
            body: "Fix your eyes on the back of the ball.".to_string(),
            category: category.to_string(),
            display_order: None,
            is_published: None,
        }
    }

    #[test]
    fn tip_without_id_is_insert() {
        let t = tip("putting");
        assert_eq!(t.write_mode(), WriteMode::Insert);
        let id = Uuid::new_v4();
        let t = SaveTip { id: Some(id), ..t };
        assert_eq!(t.write_mode(), WriteMode::Update(id));
    }

    #[test]
    fn tip_category_must_be_known() {
        assert!(tip("putting").validate().is_ok());
        assert!(tip("rules").validate().is_ok());
        assert!(tip("karaoke").validate().is_err());
    }

    #[test]
    fn empty_title_rejected() {
        let mut t = tip("putting");
        t.title.clear();
        assert!(t.validate().is_err());
    }

    #[test]
    fn drill_validation() {
        let drill = SaveDrill {
            id: None,
            title: "Gate drill".to_string(),
            description: "Two tees, one ball width apart.".to_string(),
            category: "putting".to_string(),
            difficulty: Some("advanced".to_string()),
            duration_minutes: Some(15),
            display_order: Some(2),
            is_published: Some(true),
            is_premium: Some(false),
        };
        assert!(drill.validate().is_ok());

        // Tip-only categories are not valid for drills.
        let bad = SaveDrill {
            category: "equipment".to_string(),
            ..drill.clone()
        };
        assert!(bad.validate().is_err());

        let bad = SaveDrill {
            difficulty: Some("expert".to_string()),
            ..drill.clone()
        };
        assert!(bad.validate().is_err());

        let bad = SaveDrill {
            duration_minutes: Some(0),
            ..drill
        };
        assert!(bad.validate().is_err());
    }
}
