use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::AppResult;
use crate::models::session::AuthSession;

const SESSION_FILE: &str = "session.json";

/// Persists the signed-in snapshot as a JSON blob in the data directory.
/// A missing or corrupt blob means signed-out, never an error.
pub struct SessionService {
    path: PathBuf,
}

impl SessionService {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        let mut path = data_dir.into();
        path.push(SESSION_FILE);
        Self { path }
    }

    pub fn save(&self, session: &AuthSession) -> AppResult<()> {
        let payload = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, payload)?;
        debug!(target: "app::session", user_id = %session.user.id, "session saved");
        Ok(())
    }

    pub fn load(&self) -> AppResult<Option<AuthSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!(
                    target: "app::session",
                    error = %error,
                    "session blob is corrupt, treating as signed out"
                );
                Ok(None)
            }
        }
    }

    pub fn clear(&self) -> AppResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!(target: "app::session", "session cleared");
        }
        Ok(())
    }
}
