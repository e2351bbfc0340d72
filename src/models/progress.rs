use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's standing against one indicator. At most one record exists per
/// (user, indicator) pair. `current_value` may exceed the indicator's
/// `max_value`; the calculator clamps, the record keeps the raw value.
/// `evidence_uploaded` and `validated` are independent flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: String,
    pub indicator_id: String,
    pub current_value: f64,
    pub evidence_uploaded: bool,
    pub validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpsertInput {
    pub user_id: String,
    pub indicator_id: String,
    pub current_value: f64,
    #[serde(default)]
    pub evidence_uploaded: bool,
}

/// Administrator decision over one pending record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDecision {
    pub indicator_id: String,
    pub approved: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub approved: usize,
    pub rejected: usize,
}

/// Per-user counters shown on the dashboards.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_indicators: usize,
    pub with_progress: usize,
    pub validated: usize,
    pub with_evidence: usize,
}
