use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::search::JobSearchProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable job-search backend. Production: `ApiJobsClient`.
    pub search: Arc<dyn JobSearchProvider>,
}
