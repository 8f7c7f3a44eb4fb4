pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::catalog::handlers as catalog;
use crate::mentor::handlers as mentor;
use crate::roadmap::handlers as roadmap;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Job catalog (CareerNet) and qualifications (Q-Net)
        .route("/api/v1/jobs/search", get(catalog::handle_search_jobs))
        .route("/api/v1/jobs/themes", get(catalog::handle_themes))
        .route("/api/v1/jobs/aptitudes", get(catalog::handle_aptitudes))
        .route("/api/v1/jobs/codes", get(catalog::handle_job_codes))
        .route("/api/v1/jobs/:code", get(catalog::handle_job_detail))
        .route("/api/v1/qualifications", get(catalog::handle_qualifications))
        // Roadmaps
        .route(
            "/api/v1/roadmaps",
            post(roadmap::handle_generate_roadmap).get(roadmap::handle_list_roadmaps),
        )
        .route("/api/v1/roadmaps/:id", get(roadmap::handle_get_roadmap))
        .route(
            "/api/v1/roadmaps/:id/nodes/:node_id/detail",
            post(roadmap::handle_node_detail),
        )
        // Mentor chat
        .route("/api/v1/mentor/chat", post(mentor::handle_chat))
        .with_state(state)
}
