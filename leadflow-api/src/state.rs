//! State shared by every router.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::db::DbClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub config: Arc<ApiConfig>,
    /// When the server started; reported as uptime by `/health/ready`.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: DbClient, config: ApiConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(
    db: DbClient,
    config: Arc<ApiConfig>,
    start_time: Instant,
);
