use crate::challenge::SubmissionRules;
use crate::config::Config;
use crate::db::DbPool;
use std::sync::Arc;

/// Everything a request handler needs; cloned per request by axum.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Arc<Config>) -> Self {
        Self { pool, config }
    }

    pub fn rules(&self) -> SubmissionRules {
        SubmissionRules::from_config(&self.config)
    }
}
