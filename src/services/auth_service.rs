use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::repositories::user_repository::{UserRepository, UserRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::session::AuthSession;
use crate::models::user::{User, UserCreateInput};
use crate::services::session_service::SessionService;
use crate::utils::crypto;

const MIN_PASSWORD_LENGTH: usize = 6;

/// Local user directory: credentials live in the store as salted digests,
/// sign-in state lives in the session blob.
pub struct AuthService {
    db: DbPool,
    sessions: Arc<SessionService>,
}

impl AuthService {
    pub fn new(db: DbPool, sessions: Arc<SessionService>) -> Self {
        Self { db, sessions }
    }

    pub fn create_user(&self, input: UserCreateInput) -> AppResult<User> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation_with_details(
                "姓名不能为空",
                json!({ "field": "name" }),
            ));
        }

        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation_with_details(
                "邮箱格式无效",
                json!({ "field": "email" }),
            ));
        }

        if input.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation_with_details(
                "密码长度至少为 6 位",
                json!({ "field": "password" }),
            ));
        }

        let salt = crypto::generate_salt();
        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            role: input.role,
            department: input.department,
            position: input.position,
            region: input.region,
            password_hash: crypto::hash_password(&input.password, &salt),
            password_salt: salt,
        };

        // Duplicate emails surface as a conflict through the unique index.
        self.db
            .with_connection(|conn| UserRepository::insert(conn, &row))?;

        info!(target: "app::auth", user_id = %row.id, "user created");
        Ok(row.into_user())
    }

    /// Verify the credentials and persist the signed-in snapshot. The same
    /// rejection is returned whether the email or the password was wrong.
    pub fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let normalized = email.trim().to_lowercase();
        let row = self
            .db
            .with_connection(|conn| UserRepository::find_by_email(conn, &normalized))?;

        let Some(row) = row else {
            return Err(AppError::unauthorized("邮箱或密码错误"));
        };

        if !crypto::verify_password(password, &row.password_salt, &row.password_hash) {
            return Err(AppError::unauthorized("邮箱或密码错误"));
        }

        let session = AuthSession {
            user: row.into_user(),
            signed_in_at: Utc::now(),
        };
        self.sessions.save(&session)?;

        info!(target: "app::auth", user_id = %session.user.id, "login succeeded");
        Ok(session)
    }

    pub fn logout(&self) -> AppResult<()> {
        self.sessions.clear()
    }

    /// Restore the signed-in user from the session blob. The blob is only a
    /// hint: the user is re-read from the directory, and a stale session
    /// (user since removed) restores signed-out.
    pub fn restore(&self) -> AppResult<Option<User>> {
        let Some(session) = self.sessions.load()? else {
            return Ok(None);
        };

        let row = self
            .db
            .with_connection(|conn| UserRepository::find_by_id(conn, &session.user.id))?;

        match row {
            Some(row) => Ok(Some(row.into_user())),
            None => {
                warn!(
                    target: "app::session",
                    user_id = %session.user.id,
                    "session references a removed user, signing out"
                );
                self.sessions.clear()?;
                Ok(None)
            }
        }
    }

    pub fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = self.db.with_connection(UserRepository::list)?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }
}
