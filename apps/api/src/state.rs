use std::sync::Arc;

use sqlx::MySqlPool;

use crate::catalog::client::CareerNetClient;
use crate::catalog::qualification::QualificationClient;
use crate::config::Config;
use crate::llm_client::LlmBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: MySqlPool,
    /// Every LLM-backed feature goes through this backend.
    pub llm: Arc<dyn LlmBackend>,
    pub catalog: Arc<CareerNetClient>,
    pub qualifications: QualificationClient,
    pub config: Config,
}
