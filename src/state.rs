use crate::cache::QueryCache;
use crate::config::AppConfig;
use crate::models::DashboardTables;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<QueryCache<DashboardTables>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(QueryCache::new()),
        }
    }
}
