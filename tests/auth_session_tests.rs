// Local directory sign-in and session blob restore.

use std::fs;
use std::sync::Arc;

use compensa_app::api;
use compensa_app::db::DbPool;
use compensa_app::error::AppError;
use compensa_app::models::user::{UserCreateInput, UserRole};
use compensa_app::services::auth_service::AuthService;
use compensa_app::services::session_service::SessionService;
use tempfile::tempdir;

fn setup() -> (AuthService, Arc<SessionService>, DbPool, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");
    let sessions = Arc::new(SessionService::new(dir.path()));
    let auth = AuthService::new(pool.clone(), Arc::clone(&sessions));
    (auth, sessions, pool, dir)
}

fn admin_input(email: &str) -> UserCreateInput {
    UserCreateInput {
        name: "María García".to_string(),
        email: email.to_string(),
        password: "123456".to_string(),
        role: UserRole::Admin,
        department: "Recursos Humanos".to_string(),
        position: "Coordinadora".to_string(),
        region: None,
    }
}

#[test]
fn login_round_trip_persists_the_session() {
    let (auth, _sessions, _pool, _dir) = setup();
    let user = auth.create_user(admin_input("admin@example.com")).expect("create user");

    let session = auth.login("admin@example.com", "123456").expect("login");
    assert_eq!(session.user.id, user.id);
    assert_eq!(session.user.role, UserRole::Admin);

    let restored = auth.restore().expect("restore").expect("signed in");
    assert_eq!(restored.id, user.id);

    auth.logout().expect("logout");
    assert!(auth.restore().expect("restore after logout").is_none());
}

#[test]
fn wrong_credentials_get_the_same_rejection() {
    let (auth, _sessions, _pool, _dir) = setup();
    auth.create_user(admin_input("admin@example.com")).expect("create user");

    let wrong_password = auth.login("admin@example.com", "654321");
    let unknown_email = auth.login("nobody@example.com", "123456");

    let (Err(AppError::Unauthorized { message: first }), Err(AppError::Unauthorized { message: second })) =
        (wrong_password, unknown_email)
    else {
        panic!("both rejections must be Unauthorized");
    };
    assert_eq!(first, second);
}

#[test]
fn email_lookup_is_case_insensitive_on_login() {
    let (auth, _sessions, _pool, _dir) = setup();
    auth.create_user(admin_input("Admin@Example.com")).expect("create user");

    auth.login("admin@example.com", "123456").expect("login with normalized email");
    auth.login("  ADMIN@EXAMPLE.COM ", "123456").expect("login with shouty email");
}

#[test]
fn duplicate_email_is_a_conflict() {
    let (auth, _sessions, _pool, _dir) = setup();
    auth.create_user(admin_input("admin@example.com")).expect("create user");

    let result = auth.create_user(admin_input("admin@example.com"));
    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[test]
fn short_password_is_rejected() {
    let (auth, _sessions, _pool, _dir) = setup();
    let mut input = admin_input("short@example.com");
    input.password = "12345".to_string();

    let result = auth.create_user(input);
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[test]
fn corrupt_session_blob_restores_signed_out() {
    let (auth, _sessions, _pool, dir) = setup();
    auth.create_user(admin_input("admin@example.com")).expect("create user");
    auth.login("admin@example.com", "123456").expect("login");

    fs::write(dir.path().join("session.json"), "{ not json").expect("corrupt the blob");

    assert!(auth.restore().expect("restore").is_none());
}

#[test]
fn stale_session_for_a_removed_user_restores_signed_out() {
    let (auth, _sessions, pool, _dir) = setup();
    let user = auth.create_user(admin_input("admin@example.com")).expect("create user");
    auth.login("admin@example.com", "123456").expect("login");

    pool.with_connection(|conn| {
        conn.execute("DELETE FROM users WHERE id = ?1", [user.id.as_str()])?;
        Ok(())
    })
    .expect("remove user");

    assert!(auth.restore().expect("restore").is_none());
    // The stale blob is cleaned up as well.
    assert!(auth.restore().expect("second restore").is_none());
}

#[test]
fn bootstrap_builds_a_working_state_with_the_seeded_catalog() {
    let dir = tempdir().expect("temp dir");
    let state = compensa_app::bootstrap(dir.path()).expect("bootstrap");

    let indicators = api::weight_config::indicators_list(&state).expect("catalog");
    assert_eq!(indicators.len(), 5);

    let summary = api::weight_config::weight_summary_fetch(&state).expect("summary");
    assert_eq!(summary.total_weight, 100);
    assert!(summary.balanced);

    assert!(api::auth::auth_session_restore(&state)
        .expect("restore on fresh install")
        .is_none());
}
