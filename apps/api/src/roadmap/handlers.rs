//! Axum route handlers for the Roadmap API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::roadmap::{NodeDetailRow, RoadmapRow, RoadmapSummaryRow};
use crate::roadmap::generator::{enrich_node, generate_roadmap};
use crate::roadmap::models::{NodeDetail, RoadmapNode, RoadmapRequest};
use crate::roadmap::store;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoadmapResponse {
    pub success: bool,
    pub roadmap_id: String,
    pub job_title: String,
    pub nodes: Vec<RoadmapNode>,
}

#[derive(Debug, Serialize)]
pub struct RoadmapDetailResponse {
    pub roadmap: RoadmapRow,
    pub details: Vec<NodeDetailRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetailResponse {
    pub success: bool,
    pub node_id: i64,
    pub detail: NodeDetail,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/roadmaps
///
/// Generates a roadmap with the bounded retry loop and stores it for the caller.
pub async fn handle_generate_roadmap(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RoadmapRequest>,
) -> Result<(StatusCode, Json<GenerateRoadmapResponse>), AppError> {
    let policy = state.config.roadmap_policy();
    let nodes = generate_roadmap(state.llm.as_ref(), &request, &policy).await?;

    let job_title = request.job_title.trim().to_string();
    let roadmap_id = store::insert_roadmap(&state.db, user.id, &job_title, &nodes).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateRoadmapResponse {
            success: true,
            roadmap_id,
            job_title,
            nodes,
        }),
    ))
}

/// GET /api/v1/roadmaps
///
/// Lists the caller's roadmaps, newest first.
pub async fn handle_list_roadmaps(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<RoadmapSummaryRow>>, AppError> {
    Ok(Json(store::list_roadmaps(&state.db, user.id).await?))
}

/// GET /api/v1/roadmaps/:id
pub async fn handle_get_roadmap(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RoadmapDetailResponse>, AppError> {
    let roadmap = load_owned_roadmap(&state, &user, &id).await?;
    let details = store::get_node_details(&state.db, &id).await?;

    Ok(Json(RoadmapDetailResponse { roadmap, details }))
}

/// POST /api/v1/roadmaps/:id/nodes/:node_id/detail
///
/// Enriches one node with a single LLM call and stores the result.
/// Unparseable replies are stored as free text rather than failing.
pub async fn handle_node_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, node_id)): Path<(String, i64)>,
) -> Result<Json<NodeDetailResponse>, AppError> {
    let roadmap = load_owned_roadmap(&state, &user, &id).await?;

    let nodes: Vec<RoadmapNode> = serde_json::from_value(roadmap.nodes).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Stored roadmap {id} has unreadable nodes: {e}"))
    })?;
    let node = find_node(&nodes, node_id)
        .ok_or_else(|| AppError::NotFound(format!("Node {node_id} not found in roadmap {id}")))?;

    let detail = enrich_node(state.llm.as_ref(), &roadmap.job_title, node).await?;
    store::upsert_node_detail(&state.db, &id, node_id, &detail).await?;

    Ok(Json(NodeDetailResponse {
        success: true,
        node_id,
        detail,
    }))
}

/// Someone else's roadmap is reported as missing, not forbidden.
async fn load_owned_roadmap(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> Result<RoadmapRow, AppError> {
    store::get_roadmap(&state.db, id)
        .await?
        .filter(|roadmap| owned_by(roadmap, user))
        .ok_or_else(|| AppError::NotFound(format!("Roadmap {id} not found")))
}

fn owned_by(roadmap: &RoadmapRow, user: &AuthUser) -> bool {
    roadmap.user_id == user.id
}

fn find_node(nodes: &[RoadmapNode], node_id: i64) -> Option<&RoadmapNode> {
    nodes.iter().find(|n| n.id == node_id)
}
