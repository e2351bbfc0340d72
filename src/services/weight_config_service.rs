use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::repositories::indicator_repository::IndicatorRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::indicator::{
    IndicatorCreateInput, IndicatorUpdateInput, PerformanceIndicator, WeightSummary,
};

pub const BALANCED_TOTAL_WEIGHT: i32 = 100;

pub fn total_weight(indicators: &[PerformanceIndicator]) -> i32 {
    indicators.iter().map(|indicator| indicator.weight).sum()
}

pub fn is_balanced(indicators: &[PerformanceIndicator]) -> bool {
    total_weight(indicators) == BALANCED_TOTAL_WEIGHT
}

pub struct WeightConfigService {
    db: DbPool,
}

impl WeightConfigService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn list_indicators(&self) -> AppResult<Vec<PerformanceIndicator>> {
        self.db.with_connection(IndicatorRepository::list)
    }

    /// Always computed, never blocking: an unbalanced catalog is a standing
    /// warning for the configuration surface, since intermediate editing
    /// states are legitimately unbalanced.
    pub fn weight_summary(&self) -> AppResult<WeightSummary> {
        let indicators = self.list_indicators()?;
        let total = total_weight(&indicators);
        let balanced = total == BALANCED_TOTAL_WEIGHT;

        if !balanced {
            warn!(
                target: "app::config",
                total_weight = total,
                "configured weights do not sum to 100"
            );
        }

        Ok(WeightSummary {
            total_weight: total,
            balanced,
        })
    }

    pub fn add_indicator(&self, input: IndicatorCreateInput) -> AppResult<PerformanceIndicator> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation_with_details(
                "指标名称不能为空",
                json!({ "field": "name" }),
            ));
        }
        ensure_valid_weight(input.weight)?;
        ensure_valid_max_value(input.max_value)?;

        let now = Utc::now().to_rfc3339();
        let indicator = self.db.with_connection(|conn| {
            let indicator = PerformanceIndicator {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                description: input.description.clone().unwrap_or_default(),
                weight: input.weight,
                max_value: input.max_value,
                category: input.category,
                display_order: IndicatorRepository::next_display_order(conn)?,
            };
            IndicatorRepository::insert(conn, &indicator, &now)?;
            Ok(indicator)
        })?;

        debug!(
            target: "app::config",
            indicator_id = %indicator.id,
            weight = indicator.weight,
            "indicator added"
        );

        Ok(indicator)
    }

    /// Merge the patch into the matching indicator. An unknown id is a
    /// no-op (`Ok(None)`); a malformed patch never reaches the store.
    pub fn update_indicator(
        &self,
        id: &str,
        patch: IndicatorUpdateInput,
    ) -> AppResult<Option<PerformanceIndicator>> {
        if let Some(name) = patch.name.as_deref() {
            if name.trim().is_empty() {
                return Err(AppError::validation_with_details(
                    "指标名称不能为空",
                    json!({ "field": "name" }),
                ));
            }
        }
        if let Some(weight) = patch.weight {
            ensure_valid_weight(weight)?;
        }
        if let Some(max_value) = patch.max_value {
            ensure_valid_max_value(max_value)?;
        }

        self.db.with_connection(|conn| {
            let Some(mut indicator) = IndicatorRepository::find(conn, id)? else {
                debug!(target: "app::config", indicator_id = %id, "update for unknown indicator ignored");
                return Ok(None);
            };

            if patch.is_empty() {
                return Ok(Some(indicator));
            }

            if let Some(name) = patch.name {
                indicator.name = name.trim().to_string();
            }
            if let Some(description) = patch.description {
                indicator.description = description;
            }
            if let Some(weight) = patch.weight {
                indicator.weight = weight;
            }
            if let Some(max_value) = patch.max_value {
                indicator.max_value = max_value;
            }
            if let Some(category) = patch.category {
                indicator.category = category;
            }

            let now = Utc::now().to_rfc3339();
            IndicatorRepository::update(conn, &indicator, &now)?;

            Ok(Some(indicator))
        })
    }

    /// Removing an unknown id is a no-op; removal cascades the indicator's
    /// progress rows.
    pub fn remove_indicator(&self, id: &str) -> AppResult<bool> {
        let affected = self
            .db
            .with_connection(|conn| IndicatorRepository::delete(conn, id))?;

        if affected == 0 {
            debug!(target: "app::config", indicator_id = %id, "removal for unknown indicator ignored");
            return Ok(false);
        }

        debug!(target: "app::config", indicator_id = %id, "indicator removed");
        Ok(true)
    }
}

fn ensure_valid_weight(weight: i32) -> AppResult<()> {
    if weight <= 0 || weight > BALANCED_TOTAL_WEIGHT {
        return Err(AppError::validation_with_details(
            "权重必须介于 1 和 100 之间",
            json!({ "field": "weight", "value": weight }),
        ));
    }
    Ok(())
}

fn ensure_valid_max_value(max_value: f64) -> AppResult<()> {
    if max_value <= 0.0 {
        return Err(AppError::validation_with_details(
            "最大值必须大于 0",
            json!({ "field": "maxValue", "value": max_value }),
        ));
    }
    Ok(())
}

/// Row-editing state machine for one configuration session: Viewing →
/// Editing (snapshot taken) → Saved | Cancelled. At most one indicator is
/// in the Editing state at a time; starting a second edit is a conflict.
#[derive(Debug, Default)]
pub struct EditSession {
    active: Option<ActiveEdit>,
}

#[derive(Debug, Clone)]
struct ActiveEdit {
    indicator_id: String,
    snapshot: PerformanceIndicator,
    draft: IndicatorUpdateInput,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, indicator: &PerformanceIndicator) -> AppResult<()> {
        if let Some(active) = &self.active {
            return Err(AppError::conflict(format!(
                "已有指标处于编辑状态: {}",
                active.indicator_id
            )));
        }

        self.active = Some(ActiveEdit {
            indicator_id: indicator.id.clone(),
            snapshot: indicator.clone(),
            draft: IndicatorUpdateInput::default(),
        });

        Ok(())
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.indicator_id.as_str())
    }

    /// The state of the row as it was when editing started.
    pub fn snapshot(&self) -> Option<&PerformanceIndicator> {
        self.active.as_ref().map(|active| &active.snapshot)
    }

    pub fn draft_mut(&mut self) -> Option<&mut IndicatorUpdateInput> {
        self.active.as_mut().map(|active| &mut active.draft)
    }

    /// Discard the draft and return to Viewing. Returns the untouched
    /// snapshot so the surface can restore the row display.
    pub fn cancel(&mut self) -> Option<PerformanceIndicator> {
        self.active.take().map(|active| active.snapshot)
    }

    /// Merge the draft through the service and return to Viewing. A
    /// rejected draft keeps the session in the Editing state so the caller
    /// can correct and retry.
    pub fn save(
        &mut self,
        service: &WeightConfigService,
    ) -> AppResult<Option<PerformanceIndicator>> {
        let Some(active) = self.active.take() else {
            return Err(AppError::validation("没有处于编辑状态的指标"));
        };

        match service.update_indicator(&active.indicator_id, active.draft.clone()) {
            Ok(updated) => Ok(updated),
            Err(error) => {
                self.active = Some(active);
                Err(error)
            }
        }
    }
}
