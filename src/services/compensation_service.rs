use tracing::{debug, error};

use crate::db::repositories::indicator_repository::IndicatorRepository;
use crate::db::repositories::progress_repository::ProgressRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::compensation::{
    CompensationData, ComputationFault, EmployeeOverview, IndicatorBreakdown, PerformanceLevel,
};
use crate::models::indicator::PerformanceIndicator;
use crate::models::progress::ProgressRecord;
use crate::models::user::UserRole;

/// Weighted aggregation over snapshots. Deterministic, no side effects, the
/// inputs are never mutated.
///
/// Per indicator in catalog order: the at-most-one matching record yields
/// `min(current_value / max_value, 1.0) * weight`; overshoot is clamped, not
/// bonus-weighted. Indicators without a record are omitted from the
/// breakdown entirely. An indicator whose `max_value` is not positive is a
/// configuration fault: it is skipped and reported instead of dividing, and
/// the rest of the breakdown is unaffected. The total is rounded half away
/// from zero.
pub fn compute_compensation(
    user_id: &str,
    indicators: &[PerformanceIndicator],
    progress: &[ProgressRecord],
) -> CompensationData {
    let user_progress: Vec<&ProgressRecord> =
        progress.iter().filter(|p| p.user_id == user_id).collect();

    let mut total_percentage = 0.0_f64;
    let mut breakdown = Vec::new();
    let mut faults = Vec::new();

    for indicator in indicators {
        let record = user_progress
            .iter()
            .find(|p| p.indicator_id == indicator.id);

        let Some(record) = record else {
            continue;
        };

        if indicator.max_value <= 0.0 {
            error!(
                target: "app::compensation",
                indicator_id = %indicator.id,
                max_value = indicator.max_value,
                "indicator has a non-positive max value, skipping"
            );
            faults.push(ComputationFault {
                indicator_id: indicator.id.clone(),
                message: format!("指标最大值无效: {}", indicator.max_value),
            });
            continue;
        }

        let achievement_rate = (record.current_value / indicator.max_value).min(1.0);
        let weighted_percentage = achievement_rate * f64::from(indicator.weight);
        total_percentage += weighted_percentage;

        breakdown.push(IndicatorBreakdown {
            indicator_id: indicator.id.clone(),
            percentage: weighted_percentage,
            achieved: record.current_value,
            target: indicator.max_value,
        });
    }

    CompensationData {
        user_id: user_id.to_string(),
        total_percentage: total_percentage.round() as i32,
        breakdown,
        faults,
    }
}

pub struct CompensationService {
    db: DbPool,
}

impl CompensationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Fetch the catalog and the user's records, then run the pure engine
    /// over the snapshots.
    pub fn compensation_for_user(&self, user_id: &str) -> AppResult<CompensationData> {
        let (indicators, progress) = self.db.with_connection(|conn| {
            if !UserRepository::exists(conn, user_id)? {
                return Err(AppError::not_found());
            }

            let indicators = IndicatorRepository::list(conn)?;
            let progress = ProgressRepository::list_for_user(conn, user_id)?;
            Ok((indicators, progress))
        })?;

        let data = compute_compensation(user_id, &indicators, &progress);
        debug!(
            target: "app::compensation",
            %user_id,
            total_percentage = data.total_percentage,
            entries = data.breakdown.len(),
            faults = data.faults.len(),
            "compensation computed"
        );

        Ok(data)
    }

    /// Admin overview: every employee with their compensation standing and
    /// validation counters. A fault while computing one employee's data
    /// never aborts the others; the engine degrades per indicator instead.
    pub fn team_overview(&self) -> AppResult<Vec<EmployeeOverview>> {
        let (employees, indicators) = self.db.with_connection(|conn| {
            let employees = UserRepository::list_by_role(conn, UserRole::Employee)?;
            let indicators = IndicatorRepository::list(conn)?;
            Ok((employees, indicators))
        })?;

        let total_indicators = indicators.len();
        let mut overview = Vec::with_capacity(employees.len());

        for employee in employees {
            let progress = self
                .db
                .with_connection(|conn| ProgressRepository::list_for_user(conn, &employee.id))?;

            let data = compute_compensation(&employee.id, &indicators, &progress);
            let validated = progress.iter().filter(|p| p.validated).count();
            let validation_rate = if total_indicators > 0 {
                (validated as f64 / total_indicators as f64) * 100.0
            } else {
                0.0
            };

            overview.push(EmployeeOverview {
                user: employee.into_user(),
                total_percentage: data.total_percentage,
                level: PerformanceLevel::from_percentage(data.total_percentage),
                validated,
                total_indicators,
                validation_rate,
            });
        }

        Ok(overview)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::indicator::IndicatorCategory;

    fn indicator(id: &str, weight: i32, max_value: f64, order: i32) -> PerformanceIndicator {
        PerformanceIndicator {
            id: id.to_string(),
            name: format!("indicator-{id}"),
            description: String::new(),
            weight,
            max_value,
            category: IndicatorCategory::Courses,
            display_order: order,
        }
    }

    fn record(user_id: &str, indicator_id: &str, current_value: f64) -> ProgressRecord {
        ProgressRecord {
            user_id: user_id.to_string(),
            indicator_id: indicator_id.to_string(),
            current_value,
            evidence_uploaded: false,
            validated: false,
            review_comment: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn weighted_total_matches_reference_scenario() {
        let indicators = vec![
            indicator("1", 25, 12.0, 1),
            indicator("2", 30, 50.0, 2),
            indicator("3", 20, 3.0, 3),
            indicator("4", 15, 8.0, 4),
            indicator("5", 10, 100.0, 5),
        ];
        let progress = vec![
            record("x", "1", 8.0),
            record("x", "2", 35.0),
            record("x", "3", 2.0),
            record("x", "4", 6.0),
            record("x", "5", 85.0),
        ];

        let data = compute_compensation("x", &indicators, &progress);

        // 16.67 + 21.0 + 13.33 + 11.25 + 8.5 = 70.75, rounded up
        assert_eq!(data.total_percentage, 71);
        assert_eq!(data.breakdown.len(), 5);
        assert!(data.faults.is_empty());
        assert!((data.breakdown[1].percentage - 21.0).abs() < 1e-9);
        assert!((data.breakdown[3].percentage - 11.25).abs() < 1e-9);
    }

    #[test]
    fn overshoot_is_clamped_to_the_indicator_weight() {
        let indicators = vec![indicator("1", 40, 10.0, 1)];
        let progress = vec![record("x", "1", 25.0)];

        let data = compute_compensation("x", &indicators, &progress);

        assert_eq!(data.total_percentage, 40);
        assert!((data.breakdown[0].percentage - 40.0).abs() < 1e-9);
        assert!((data.breakdown[0].achieved - 25.0).abs() < 1e-9);
    }

    #[test]
    fn full_achievement_on_balanced_weights_totals_one_hundred() {
        let indicators = vec![
            indicator("1", 60, 4.0, 1),
            indicator("2", 30, 9.0, 2),
            indicator("3", 10, 1.0, 3),
        ];
        let progress = vec![
            record("x", "1", 4.0),
            record("x", "2", 9.0),
            record("x", "3", 1.0),
        ];

        let data = compute_compensation("x", &indicators, &progress);

        assert_eq!(data.total_percentage, 100);
    }

    #[test]
    fn user_without_records_yields_zero_and_empty_breakdown() {
        let indicators = vec![indicator("1", 50, 10.0, 1), indicator("2", 50, 10.0, 2)];
        let progress = vec![record("someone-else", "1", 10.0)];

        let data = compute_compensation("x", &indicators, &progress);

        assert_eq!(data.total_percentage, 0);
        assert!(data.breakdown.is_empty());
        assert!(data.faults.is_empty());
    }

    #[test]
    fn zero_current_value_still_appears_in_the_breakdown() {
        let indicators = vec![indicator("1", 100, 10.0, 1)];
        let progress = vec![record("x", "1", 0.0)];

        let data = compute_compensation("x", &indicators, &progress);

        assert_eq!(data.total_percentage, 0);
        assert_eq!(data.breakdown.len(), 1);
        assert!((data.breakdown[0].percentage).abs() < 1e-9);
    }

    #[test]
    fn non_positive_max_value_is_reported_not_divided() {
        let indicators = vec![indicator("bad", 50, 0.0, 1), indicator("ok", 50, 10.0, 2)];
        let progress = vec![record("x", "bad", 3.0), record("x", "ok", 5.0)];

        let data = compute_compensation("x", &indicators, &progress);

        // The broken indicator is excluded; the healthy one still counts.
        assert_eq!(data.total_percentage, 25);
        assert_eq!(data.breakdown.len(), 1);
        assert_eq!(data.breakdown[0].indicator_id, "ok");
        assert_eq!(data.faults.len(), 1);
        assert_eq!(data.faults[0].indicator_id, "bad");
    }

    #[test]
    fn breakdown_follows_catalog_order() {
        let indicators = vec![
            indicator("b", 30, 10.0, 1),
            indicator("a", 30, 10.0, 2),
            indicator("c", 40, 10.0, 3),
        ];
        let progress = vec![
            record("x", "c", 1.0),
            record("x", "a", 1.0),
            record("x", "b", 1.0),
        ];

        let data = compute_compensation("x", &indicators, &progress);

        let order: Vec<&str> = data
            .breakdown
            .iter()
            .map(|entry| entry.indicator_id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn performance_level_bands() {
        assert_eq!(
            PerformanceLevel::from_percentage(95),
            PerformanceLevel::Excellent
        );
        assert_eq!(
            PerformanceLevel::from_percentage(90),
            PerformanceLevel::Excellent
        );
        assert_eq!(
            PerformanceLevel::from_percentage(75),
            PerformanceLevel::VeryGood
        );
        assert_eq!(PerformanceLevel::from_percentage(60), PerformanceLevel::Good);
        assert_eq!(
            PerformanceLevel::from_percentage(59),
            PerformanceLevel::NeedsImprovement
        );
    }
}
