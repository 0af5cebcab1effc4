//! End-user profile rows and subscription enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    Premium,
    Pro,
}

impl SubscriptionTier {
    /// Canonical display order for tier breakdowns.
    pub const KEYS: &'static [&'static str] = &["free", "premium", "pro"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Pro => "pro",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub const KEYS: &'static [&'static str] = &["active", "trial", "expired", "cancelled"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trial => "trial",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Profile row as stored. Tier and status stay free text so that values the
/// dashboard does not know about still show up in breakdowns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub subscription_tier: Option<String>,
    pub subscription_status: Option<String>,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn has_tier(&self, tier: SubscriptionTier) -> bool {
        self.subscription_tier.as_deref() == Some(tier.as_str())
    }

    pub fn has_status(&self, status: SubscriptionStatus) -> bool {
        self.subscription_status.as_deref() == Some(status.as_str())
    }

    /// Any tier other than free. A missing tier counts as free.
    pub fn is_paying(&self) -> bool {
        matches!(self.subscription_tier.as_deref(), Some(t) if t != SubscriptionTier::Free.as_str())
    }
}

/// Profile with per-user activity counts, as listed on the users page.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    #[serde(flatten)]
    pub profile: Profile,
    pub rounds_count: u64,
    pub swings_count: u64,
}

/// Optional filters for the users listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilters {
    pub search: Option<String>,
    pub tier: Option<SubscriptionTier>,
}

impl UserFilters {
    /// Case-insensitive substring match on display name or email, plus exact tier.
    pub fn matches(&self, profile: &Profile) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&profile.display_name, &profile.email]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        };
        let matches_tier = self.tier.map_or(true, |tier| profile.has_tier(tier));
        matches_search && matches_tier
    }
}

/// Subscription page filter.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionFilter {
    #[default]
    All,
    Paying,
    Free,
    Premium,
    Pro,
    Trial,
    Cancelled,
}

impl SubscriptionFilter {
    pub fn matches(self, profile: &Profile) -> bool {
        match self {
            Self::All => true,
            Self::Paying => profile.is_paying(),
            Self::Free => profile.has_tier(SubscriptionTier::Free),
            Self::Premium => profile.has_tier(SubscriptionTier::Premium),
            Self::Pro => profile.has_tier(SubscriptionTier::Pro),
            Self::Trial => profile.has_status(SubscriptionStatus::Trial),
            Self::Cancelled => profile.has_status(SubscriptionStatus::Cancelled),
        }
    }
}

/// Admin override of one user's subscription.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscription {
    pub user_id: Uuid,
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
}
