pub mod auth;
pub mod compensation;
pub mod progress;
pub mod weight_config;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use crate::db::DbPool;
use crate::error::AppError;
use crate::services::auth_service::AuthService;
use crate::services::compensation_service::CompensationService;
use crate::services::progress_service::ProgressService;
use crate::services::session_service::SessionService;
use crate::services::weight_config_service::WeightConfigService;

/// Service composition handed to the presentation layer. All services share
/// the same pool; snapshots are taken per call.
#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    auth_service: Arc<AuthService>,
    session_service: Arc<SessionService>,
    compensation_service: Arc<CompensationService>,
    weight_config_service: Arc<WeightConfigService>,
    progress_service: Arc<ProgressService>,
}

impl AppState {
    pub fn new(db_pool: DbPool, data_dir: impl Into<PathBuf>) -> Self {
        let session_service = Arc::new(SessionService::new(data_dir));
        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            Arc::clone(&session_service),
        ));
        let compensation_service = Arc::new(CompensationService::new(db_pool.clone()));
        let weight_config_service = Arc::new(WeightConfigService::new(db_pool.clone()));
        let progress_service = Arc::new(ProgressService::new(db_pool.clone()));

        Self {
            db_pool,
            auth_service,
            session_service,
            compensation_service,
            weight_config_service,
            progress_service,
        }
    }

    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth_service)
    }

    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.session_service)
    }

    pub fn compensation(&self) -> Arc<CompensationService> {
        Arc::clone(&self.compensation_service)
    }

    pub fn weight_config(&self) -> Arc<WeightConfigService> {
        Arc::clone(&self.weight_config_service)
    }

    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress_service)
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ApiError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message, details } => {
                ApiError::new("VALIDATION_ERROR", message, details)
            }
            AppError::NotFound => ApiError::new("NOT_FOUND", "请求的资源不存在", None),
            AppError::Conflict { message } => ApiError::new("CONFLICT", message, None),
            AppError::Computation {
                indicator_id,
                message,
            } => {
                error!(target: "app::api", %indicator_id, %message, "computation fault in api call");
                ApiError::new(
                    "COMPUTATION_ERROR",
                    message,
                    Some(json!({ "indicatorId": indicator_id })),
                )
            }
            AppError::Unauthorized { message } => {
                warn!(target: "app::api", %message, "unauthorized api call");
                ApiError::new("UNAUTHORIZED", message, None)
            }
            AppError::Database { message } => {
                error!(target: "app::api", %message, "database error in api call");
                ApiError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::api", error = %error, "serialization error in api call");
                ApiError::new("UNKNOWN", "序列化失败", None)
            }
            AppError::Io(error) => {
                error!(target: "app::api", error = %error, "io error in api call");
                ApiError::new("UNKNOWN", "文件系统读写失败", None)
            }
            AppError::Other(message) => {
                error!(target: "app::api", %message, "unexpected error in api call");
                ApiError::new("UNKNOWN", message, None)
            }
        }
    }
}
