use serde::Serialize;

use crate::models::user::User;

/// Derived compensation result for one user. Never stored; recomputed from
/// the indicator catalog and the user's progress records on every fetch.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompensationData {
    pub user_id: String,
    /// Weighted total, rounded half away from zero.
    pub total_percentage: i32,
    /// One entry per indicator with a matching record, in catalog order.
    pub breakdown: Vec<IndicatorBreakdown>,
    /// Indicators skipped because their configuration made the achievement
    /// rate undefined. The rest of the breakdown is unaffected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<ComputationFault>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorBreakdown {
    pub indicator_id: String,
    /// Achievement rate (capped at 1.0) times the indicator weight.
    pub percentage: f64,
    pub achieved: f64,
    pub target: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputationFault {
    pub indicator_id: String,
    pub message: String,
}

/// Classification bands used by the summary card.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    VeryGood,
    Good,
    NeedsImprovement,
}

impl PerformanceLevel {
    pub fn from_percentage(total_percentage: i32) -> Self {
        if total_percentage >= 90 {
            PerformanceLevel::Excellent
        } else if total_percentage >= 75 {
            PerformanceLevel::VeryGood
        } else if total_percentage >= 60 {
            PerformanceLevel::Good
        } else {
            PerformanceLevel::NeedsImprovement
        }
    }
}

/// Admin overview row: one employee with their compensation standing and
/// validation counters.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeOverview {
    #[serde(flatten)]
    pub user: User,
    pub total_percentage: i32,
    pub level: PerformanceLevel,
    pub validated: usize,
    pub total_indicators: usize,
    pub validation_rate: f64,
}
