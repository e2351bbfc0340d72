use std::convert::TryFrom;

use rusqlite::types::Type;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::user::{User, UserRole};

/// Full row including the credential columns. Only the service layer sees
/// this; everything display-facing goes through [`UserRow::into_user`].
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: String,
    pub position: String,
    pub region: Option<String>,
    pub password_hash: String,
    pub password_salt: String,
}

impl TryFrom<&Row<'_>> for UserRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        let role_text: String = row.get("role")?;
        let role = UserRole::from_str(&role_text)
            .map_err(|_| rusqlite::Error::InvalidColumnType(3, "role".to_string(), Type::Text))?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            role,
            department: row.get("department")?,
            position: row.get("position")?,
            region: row.get("region")?,
            password_hash: row.get("password_hash")?,
            password_salt: row.get("password_salt")?,
        })
    }
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            department: self.department,
            position: self.position,
            region: self.region,
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, name, email, role, department, position, region, password_hash, password_salt";

pub struct UserRepository;

impl UserRepository {
    pub fn insert(conn: &Connection, row: &UserRow) -> AppResult<()> {
        conn.execute(
            r#"
            INSERT INTO users (id, name, email, role, department, position, region, password_hash, password_salt)
            VALUES (:id, :name, :email, :role, :department, :position, :region, :password_hash, :password_salt)
            "#,
            named_params! {
                ":id": row.id,
                ":name": row.name,
                ":email": row.email,
                ":role": row.role.as_str(),
                ":department": row.department,
                ":position": row.position,
                ":region": row.region,
                ":password_hash": row.password_hash,
                ":password_salt": row.password_salt,
            },
        )?;

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<UserRow>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = ?1"))?;

        let row = stmt
            .query_row([id], |row| UserRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<UserRow>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE email = ?1"))?;

        let row = stmt
            .query_row([email], |row| UserRow::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn list(conn: &Connection) -> AppResult<Vec<UserRow>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM users ORDER BY name ASC"))?;

        let rows = stmt
            .query_map([], |row| UserRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn list_by_role(conn: &Connection, role: UserRole) -> AppResult<Vec<UserRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE role = ?1 ORDER BY name ASC"
        ))?;

        let rows = stmt
            .query_map([role.as_str()], |row| UserRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn exists(conn: &Connection, id: &str) -> AppResult<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;

        Ok(exists)
    }
}
