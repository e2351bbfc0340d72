pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::Path;

use crate::api::AppState;
use crate::error::AppResult;

/// Initialize logging, open the store under `data_dir`, and hand back the
/// application state the presentation layer drives.
pub fn bootstrap<P: AsRef<Path>>(data_dir: P) -> AppResult<AppState> {
    let data_dir = data_dir.as_ref();
    std::fs::create_dir_all(data_dir)?;

    utils::logger::init_logging(data_dir)?;

    let pool = db::DbPool::open_in_dir(data_dir)?;

    Ok(AppState::new(pool, data_dir))
}
