//! Derived-metrics dispatch: fetch the rows a page needs, then build its report.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::data::{self, SourceFailure};
use super::store::{Store, AI_ANALYTICS_LIMIT};
use crate::errors::AppError;
use crate::metrics::reports::{
    self, AiUsageReport, FeedbackReport, OverviewReport, SubscriptionReport, TicketReport,
};

/// Report selected by the metrics endpoint's `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsKind {
    Overview,
    Subscriptions,
    Tickets,
    Feedback,
    AiAnalytics,
}

impl FromStr for MetricsKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "overview" => Self::Overview,
            "subscriptions" => Self::Subscriptions,
            "tickets" => Self::Tickets,
            "feedback" => Self::Feedback,
            "ai_analytics" => Self::AiAnalytics,
            other => return Err(AppError::InvalidType(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl MetricsQuery {
    pub fn kind(&self) -> Result<MetricsKind, AppError> {
        self.kind.as_deref().unwrap_or_default().parse()
    }
}

/// A report computed from whatever sources loaded, plus the ones that did not.
#[derive(Debug, Serialize)]
pub struct Partial<T: Serialize> {
    #[serde(flatten)]
    pub report: T,
    pub unavailable: Vec<SourceFailure>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MetricsPayload {
    Overview(Box<Partial<OverviewReport>>),
    Subscriptions(Box<SubscriptionReport>),
    Tickets(TicketReport),
    Feedback(FeedbackReport),
    AiAnalytics(Box<AiUsageReport>),
}

/// Fetch and derive the report for `kind`. Metrics are recomputed on every call.
pub async fn compute(store: Store<'_>, kind: MetricsKind) -> Result<MetricsPayload, AppError> {
    let payload = match kind {
        MetricsKind::Overview => {
            let data = data::load_overview(store).await;
            let report = reports::overview(data.rows(), Utc::now());
            MetricsPayload::Overview(Box::new(Partial {
                report,
                unavailable: data.failures(),
            }))
        }
        MetricsKind::Subscriptions => {
            let profiles = store.profiles().await?;
            MetricsPayload::Subscriptions(Box::new(reports::subscriptions(&profiles, Utc::now())))
        }
        MetricsKind::Tickets => MetricsPayload::Tickets(reports::tickets(&store.tickets().await?)),
        MetricsKind::Feedback => {
            let feedback = store.feedback().await?;
            MetricsPayload::Feedback(reports::feedback(&feedback, Utc::now()))
        }
        MetricsKind::AiAnalytics => {
            let conversations = store.conversations(Some(AI_ANALYTICS_LIMIT)).await?;
            MetricsPayload::AiAnalytics(Box::new(reports::ai_usage(&conversations, Utc::now())))
        }
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{StoreError, StoreErrorKind};
    use crate::errors::ApiError;
    use crate::metrics::reports::OverviewRows;

    #[test]
    fn metrics_kinds_parse() {
        assert_eq!("overview".parse::<MetricsKind>().unwrap(), MetricsKind::Overview);
        assert_eq!("ai_analytics".parse::<MetricsKind>().unwrap(), MetricsKind::AiAnalytics);
        // Content lists have no derived metrics.
        assert!(matches!("tips".parse::<MetricsKind>(), Err(AppError::InvalidType(_))));
        assert!(MetricsQuery::default().kind().is_err());
    }

    #[test]
    fn partial_report_flattens_and_lists_failures() {
        let report = reports::overview(OverviewRows::default(), Utc::now());
        let partial = Partial {
            report,
            unavailable: vec![SourceFailure {
                source: "rounds",
                error: ApiError::from(&StoreError::new(StoreErrorKind::Connection, "down")),
            }],
        };
        let json = serde_json::to_value(&partial).unwrap();
        assert_eq!(json["total_users"], 0);
        assert_eq!(json["unavailable"][0]["source"], "rounds");
        assert_eq!(json["unavailable"][0]["error"]["code"], "STORE_UNAVAILABLE");
    }
}
