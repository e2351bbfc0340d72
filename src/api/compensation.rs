use serde::Serialize;

use crate::models::compensation::{CompensationData, EmployeeOverview, PerformanceLevel};

use super::{ApiResult, AppState};

/// Compensation data plus the classification band the summary card shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationView {
    #[serde(flatten)]
    pub data: CompensationData,
    pub level: PerformanceLevel,
}

pub fn compensation_fetch(state: &AppState, user_id: &str) -> ApiResult<CompensationView> {
    let data = state.compensation().compensation_for_user(user_id)?;
    let level = PerformanceLevel::from_percentage(data.total_percentage);
    Ok(CompensationView { data, level })
}

pub fn compensation_team_overview(state: &AppState) -> ApiResult<Vec<EmployeeOverview>> {
    let overview = state.compensation().team_overview()?;
    Ok(overview)
}
