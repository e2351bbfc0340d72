use serde::Deserialize;

use crate::models::session::AuthSession;
use crate::models::user::{User, UserCreateInput};

use super::{ApiResult, AppState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub fn auth_login(state: &AppState, payload: LoginPayload) -> ApiResult<AuthSession> {
    let session = state.auth().login(&payload.email, &payload.password)?;
    Ok(session)
}

pub fn auth_logout(state: &AppState) -> ApiResult<()> {
    state.auth().logout()?;
    Ok(())
}

/// Session restore on startup. Missing, corrupt, or stale blobs come back
/// as `None` (signed out), never as an error.
pub fn auth_session_restore(state: &AppState) -> ApiResult<Option<User>> {
    let user = state.auth().restore()?;
    Ok(user)
}

pub fn users_create(state: &AppState, payload: UserCreateInput) -> ApiResult<User> {
    let user = state.auth().create_user(payload)?;
    Ok(user)
}

pub fn users_list(state: &AppState) -> ApiResult<Vec<User>> {
    let users = state.auth().list_users()?;
    Ok(users)
}
