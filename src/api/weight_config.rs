use crate::models::indicator::{
    IndicatorCreateInput, IndicatorUpdateInput, PerformanceIndicator, WeightSummary,
};

use super::{ApiResult, AppState};

pub fn indicators_list(state: &AppState) -> ApiResult<Vec<PerformanceIndicator>> {
    let indicators = state.weight_config().list_indicators()?;
    Ok(indicators)
}

pub fn indicators_add(
    state: &AppState,
    payload: IndicatorCreateInput,
) -> ApiResult<PerformanceIndicator> {
    let indicator = state.weight_config().add_indicator(payload)?;
    Ok(indicator)
}

/// Unknown ids are a no-op and come back as `None`, matching the
/// row-editing surface that tolerates rows deleted underneath it.
pub fn indicators_update(
    state: &AppState,
    id: &str,
    patch: IndicatorUpdateInput,
) -> ApiResult<Option<PerformanceIndicator>> {
    let updated = state.weight_config().update_indicator(id, patch)?;
    Ok(updated)
}

pub fn indicators_remove(state: &AppState, id: &str) -> ApiResult<bool> {
    let removed = state.weight_config().remove_indicator(id)?;
    Ok(removed)
}

/// The standing total-weight badge. Imbalance is reported, never an error.
pub fn weight_summary_fetch(state: &AppState) -> ApiResult<WeightSummary> {
    let summary = state.weight_config().weight_summary()?;
    Ok(summary)
}
