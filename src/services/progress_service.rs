use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use crate::db::repositories::indicator_repository::IndicatorRepository;
use crate::db::repositories::progress_repository::ProgressRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::progress::{
    ProgressRecord, ProgressStats, ProgressUpsertInput, ValidationDecision, ValidationSummary,
};

pub struct ProgressService {
    db: DbPool,
}

impl ProgressService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Insert-or-update the record for the (user, indicator) pair. New
    /// records start unvalidated; updating a value leaves the validation
    /// flag alone, the flags are independent.
    pub fn upsert_progress(&self, input: ProgressUpsertInput) -> AppResult<ProgressRecord> {
        if input.current_value < 0.0 {
            return Err(AppError::validation_with_details(
                "进度值不能为负数",
                json!({ "field": "currentValue", "value": input.current_value }),
            ));
        }

        let now = Utc::now().to_rfc3339();
        self.db.with_connection(|conn| {
            if !UserRepository::exists(conn, &input.user_id)? {
                return Err(AppError::database(format!(
                    "User not found: {}",
                    input.user_id
                )));
            }
            if !IndicatorRepository::exists(conn, &input.indicator_id)? {
                return Err(AppError::database(format!(
                    "Indicator not found: {}",
                    input.indicator_id
                )));
            }

            ProgressRepository::upsert(
                conn,
                &input.user_id,
                &input.indicator_id,
                input.current_value,
                input.evidence_uploaded,
                &now,
            )?;

            let record = ProgressRepository::find(conn, &input.user_id, &input.indicator_id)?
                .ok_or_else(|| AppError::other("Failed to read back upserted progress"))?;

            debug!(
                target: "app::progress",
                user_id = %record.user_id,
                indicator_id = %record.indicator_id,
                current_value = record.current_value,
                "progress upserted"
            );

            Ok(record)
        })
    }

    pub fn list_for_user(&self, user_id: &str) -> AppResult<Vec<ProgressRecord>> {
        self.db
            .with_connection(|conn| ProgressRepository::list_for_user(conn, user_id))
    }

    /// Records awaiting review, for the admin validation surface.
    pub fn pending_for_user(&self, user_id: &str) -> AppResult<Vec<ProgressRecord>> {
        self.db
            .with_connection(|conn| ProgressRepository::list_pending_for_user(conn, user_id))
    }

    /// Apply a batch of review decisions. A decision pointing at a missing
    /// record is skipped with a warning; the remaining decisions still
    /// apply.
    pub fn apply_validation(
        &self,
        user_id: &str,
        decisions: &[ValidationDecision],
        comment: Option<&str>,
    ) -> AppResult<ValidationSummary> {
        let now = Utc::now().to_rfc3339();
        let mut summary = ValidationSummary::default();

        self.db.with_connection(|conn| {
            for decision in decisions {
                let affected = ProgressRepository::set_validation(
                    conn,
                    user_id,
                    &decision.indicator_id,
                    decision.approved,
                    comment,
                    &now,
                )?;

                if affected == 0 {
                    warn!(
                        target: "app::progress",
                        %user_id,
                        indicator_id = %decision.indicator_id,
                        "validation decision for missing record skipped"
                    );
                    continue;
                }

                if decision.approved {
                    summary.approved += 1;
                } else {
                    summary.rejected += 1;
                }
            }

            Ok(())
        })?;

        debug!(
            target: "app::progress",
            %user_id,
            approved = summary.approved,
            rejected = summary.rejected,
            "validation batch applied"
        );

        Ok(summary)
    }

    /// Dashboard counters for one user.
    pub fn stats_for_user(&self, user_id: &str) -> AppResult<ProgressStats> {
        self.db.with_connection(|conn| {
            let indicators = IndicatorRepository::list(conn)?;
            let records = ProgressRepository::list_for_user(conn, user_id)?;

            Ok(ProgressStats {
                total_indicators: indicators.len(),
                with_progress: records.len(),
                validated: records.iter().filter(|r| r.validated).count(),
                with_evidence: records.iter().filter(|r| r.evidence_uploaded).count(),
            })
        })
    }
}
