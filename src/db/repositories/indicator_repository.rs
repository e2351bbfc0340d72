use rusqlite::types::Type;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::indicator::{IndicatorCategory, PerformanceIndicator};

const SELECT_COLUMNS: &str = "id, name, description, weight, max_value, category, display_order";

pub struct IndicatorRepository;

impl IndicatorRepository {
    /// Catalog in display order; this is the order breakdowns follow.
    pub fn list(conn: &Connection) -> AppResult<Vec<PerformanceIndicator>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM performance_indicators ORDER BY display_order ASC"
        ))?;

        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn find(conn: &Connection, id: &str) -> AppResult<Option<PerformanceIndicator>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM performance_indicators WHERE id = ?1"
        ))?;

        let row = stmt.query_row([id], Self::map_row).optional()?;

        Ok(row)
    }

    pub fn insert(conn: &Connection, indicator: &PerformanceIndicator, now: &str) -> AppResult<()> {
        conn.execute(
            r#"
            INSERT INTO performance_indicators
                (id, name, description, weight, max_value, category, display_order, created_at, updated_at)
            VALUES (:id, :name, :description, :weight, :max_value, :category, :display_order, :now, :now)
            "#,
            named_params! {
                ":id": indicator.id,
                ":name": indicator.name,
                ":description": indicator.description,
                ":weight": indicator.weight,
                ":max_value": indicator.max_value,
                ":category": indicator.category.as_str(),
                ":display_order": indicator.display_order,
                ":now": now,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, indicator: &PerformanceIndicator, now: &str) -> AppResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE performance_indicators
            SET name = :name,
                description = :description,
                weight = :weight,
                max_value = :max_value,
                category = :category,
                updated_at = :now
            WHERE id = :id
            "#,
            named_params! {
                ":id": indicator.id,
                ":name": indicator.name,
                ":description": indicator.description,
                ":weight": indicator.weight,
                ":max_value": indicator.max_value,
                ":category": indicator.category.as_str(),
                ":now": now,
            },
        )?;

        Ok(affected)
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<usize> {
        let affected = conn.execute("DELETE FROM performance_indicators WHERE id = ?1", [id])?;
        Ok(affected)
    }

    pub fn exists(conn: &Connection, id: &str) -> AppResult<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM performance_indicators WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    pub fn next_display_order(conn: &Connection) -> AppResult<i32> {
        let max: i32 = conn.query_row(
            "SELECT COALESCE(MAX(display_order), 0) FROM performance_indicators",
            [],
            |row| row.get(0),
        )?;

        Ok(max + 1)
    }

    fn map_row(row: &Row<'_>) -> Result<PerformanceIndicator, rusqlite::Error> {
        let category_text: String = row.get("category")?;
        let category = IndicatorCategory::from_str(&category_text).map_err(|_| {
            rusqlite::Error::InvalidColumnType(5, "category".to_string(), Type::Text)
        })?;

        Ok(PerformanceIndicator {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            weight: row.get("weight")?,
            max_value: row.get("max_value")?,
            category,
            display_order: row.get("display_order")?,
        })
    }
}
