use chrono::Utc;
use rusqlite::{Connection, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::AppResult;

const USER_VERSION: i32 = 2;

pub fn run(conn: &Connection) -> AppResult<()> {
    // Ensure migration history table exists
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );
        "#,
    )?;

    let mut current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(conn, 1, "Seed default indicator catalog")?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(conn, 2, "Add review comments and pending-validation index")?;
    }

    if current_version != USER_VERSION {
        conn.execute(&format!("PRAGMA user_version = {}", USER_VERSION), [])?;
    }

    Ok(())
}

fn record_migration(conn: &Connection, version: i32, description: &str) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO migration_history (version, description, applied_at) VALUES (?, ?, ?)",
        (version, description, now),
    )?;
    Ok(())
}

/// The catalog shipped with a fresh install. Weights sum to exactly 100 so
/// a new deployment starts balanced.
fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    let defaults: [(&str, &str, i32, f64, &str); 5] = [
        ("完成课程", "考核周期内完成的培训课程数", 25, 12.0, "courses"),
        ("解决问题", "成功处理的工单或问题数", 30, 50.0, "tickets"),
        ("专业认证", "取得的专业认证数量", 20, 3.0, "certifications"),
        ("内部参与", "参与的内部活动与项目数", 15, 8.0, "activities"),
        ("绩效评估", "年度绩效评估得分", 10, 100.0, "evaluation"),
    ];

    let now = Utc::now().to_rfc3339();
    for (order, (name, description, weight, max_value, category)) in defaults.into_iter().enumerate() {
        conn.execute(
            r#"
            INSERT INTO performance_indicators
                (id, name, description, weight, max_value, category, display_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            (
                Uuid::new_v4().to_string(),
                name,
                description,
                weight,
                max_value,
                category,
                order as i32 + 1,
                now.as_str(),
                now.as_str(),
            ),
        )?;
    }

    Ok(())
}

fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    ensure_column(conn, "employee_progress", "review_comment", "TEXT")?;

    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_employee_progress_pending
            ON employee_progress(user_id) WHERE validated = 0;
        "#,
    )?;

    Ok(())
}

fn ensure_column(conn: &Connection, table: &str, column: &str, definition: &str) -> AppResult<()> {
    if !column_exists(conn, table, column)? {
        let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {definition};");
        conn.execute(&sql, [])?;
    }
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let pragma = format!("PRAGMA table_info({table})");
    let mut stmt = conn.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    while let Some(row) = rows.next()? {
        if equals_name(&row, column)? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn equals_name(row: &Row<'_>, column: &str) -> Result<bool, rusqlite::Error> {
    let name: String = row.get(1)?;
    Ok(name.eq_ignore_ascii_case(column))
}
