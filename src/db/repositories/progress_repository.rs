use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::progress::ProgressRecord;

const SELECT_COLUMNS: &str =
    "p.user_id, p.indicator_id, p.current_value, p.evidence_uploaded, p.validated, p.review_comment, p.last_updated";

pub struct ProgressRepository;

impl ProgressRepository {
    pub fn find(
        conn: &Connection,
        user_id: &str,
        indicator_id: &str,
    ) -> AppResult<Option<ProgressRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM employee_progress p WHERE p.user_id = ?1 AND p.indicator_id = ?2"
        ))?;

        let row = stmt
            .query_row([user_id, indicator_id], Self::map_row)
            .optional()?;

        Ok(row)
    }

    /// A user's records joined against the catalog so they come back in
    /// display order.
    pub fn list_for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<ProgressRecord>> {
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM employee_progress p
            JOIN performance_indicators i ON i.id = p.indicator_id
            WHERE p.user_id = ?1
            ORDER BY i.display_order ASC
            "#
        ))?;

        let rows = stmt
            .query_map([user_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn list_pending_for_user(
        conn: &Connection,
        user_id: &str,
    ) -> AppResult<Vec<ProgressRecord>> {
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM employee_progress p
            JOIN performance_indicators i ON i.id = p.indicator_id
            WHERE p.user_id = ?1 AND p.validated = 0
            ORDER BY i.display_order ASC
            "#
        ))?;

        let rows = stmt
            .query_map([user_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Insert-or-update on the composite key. The validation flag and the
    /// review comment belong to the review flow and are left untouched on
    /// update.
    pub fn upsert(
        conn: &Connection,
        user_id: &str,
        indicator_id: &str,
        current_value: f64,
        evidence_uploaded: bool,
        now: &str,
    ) -> AppResult<()> {
        conn.execute(
            r#"
            INSERT INTO employee_progress
                (user_id, indicator_id, current_value, evidence_uploaded, validated, last_updated)
            VALUES (:user_id, :indicator_id, :current_value, :evidence_uploaded, 0, :now)
            ON CONFLICT(user_id, indicator_id) DO UPDATE SET
                current_value = excluded.current_value,
                evidence_uploaded = excluded.evidence_uploaded,
                last_updated = excluded.last_updated
            "#,
            named_params! {
                ":user_id": user_id,
                ":indicator_id": indicator_id,
                ":current_value": current_value,
                ":evidence_uploaded": evidence_uploaded,
                ":now": now,
            },
        )?;

        Ok(())
    }

    pub fn set_validation(
        conn: &Connection,
        user_id: &str,
        indicator_id: &str,
        validated: bool,
        review_comment: Option<&str>,
        now: &str,
    ) -> AppResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE employee_progress
            SET validated = :validated,
                review_comment = :review_comment,
                last_updated = :now
            WHERE user_id = :user_id AND indicator_id = :indicator_id
            "#,
            named_params! {
                ":user_id": user_id,
                ":indicator_id": indicator_id,
                ":validated": validated,
                ":review_comment": review_comment,
                ":now": now,
            },
        )?;

        Ok(affected)
    }

    fn map_row(row: &Row<'_>) -> Result<ProgressRecord, rusqlite::Error> {
        let last_updated_text: String = row.get("last_updated")?;
        let last_updated = DateTime::parse_from_rfc3339(&last_updated_text)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(6, "last_updated".to_string(), Type::Text)
            })?
            .with_timezone(&Utc);

        Ok(ProgressRecord {
            user_id: row.get("user_id")?,
            indicator_id: row.get("indicator_id")?,
            current_value: row.get("current_value")?,
            evidence_uploaded: row.get("evidence_uploaded")?,
            validated: row.get("validated")?,
            review_comment: row.get("review_comment")?,
            last_updated,
        })
    }
}
