use serde::Deserialize;

use crate::models::progress::{
    ProgressRecord, ProgressStats, ProgressUpsertInput, ValidationDecision, ValidationSummary,
};

use super::{ApiResult, AppState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSubmitPayload {
    pub user_id: String,
    pub decisions: Vec<ValidationDecision>,
    pub comment: Option<String>,
}

pub fn progress_list(state: &AppState, user_id: &str) -> ApiResult<Vec<ProgressRecord>> {
    let records = state.progress().list_for_user(user_id)?;
    Ok(records)
}

pub fn progress_upsert(state: &AppState, payload: ProgressUpsertInput) -> ApiResult<ProgressRecord> {
    let record = state.progress().upsert_progress(payload)?;
    Ok(record)
}

pub fn progress_stats(state: &AppState, user_id: &str) -> ApiResult<ProgressStats> {
    let stats = state.progress().stats_for_user(user_id)?;
    Ok(stats)
}

pub fn validation_pending(state: &AppState, user_id: &str) -> ApiResult<Vec<ProgressRecord>> {
    let records = state.progress().pending_for_user(user_id)?;
    Ok(records)
}

pub fn validation_submit(
    state: &AppState,
    payload: ValidationSubmitPayload,
) -> ApiResult<ValidationSummary> {
    let summary = state.progress().apply_validation(
        &payload.user_id,
        &payload.decisions,
        payload.comment.as_deref(),
    )?;
    Ok(summary)
}
