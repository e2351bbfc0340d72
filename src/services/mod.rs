pub mod auth_service;
pub mod compensation_service;
pub mod progress_service;
pub mod session_service;
pub mod weight_config_service;
