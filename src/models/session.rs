use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Signed-in snapshot persisted to the session blob. A missing or corrupt
/// blob restores to the signed-out state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub signed_in_at: DateTime<Utc>,
}
