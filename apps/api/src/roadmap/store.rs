//! Roadmap persistence. Roadmaps are write-once JSON blobs; node details are
//! replaced whenever a node is enriched again.

use sqlx::types::Json;
use sqlx::MySqlPool;
use tracing::info;
use uuid::Uuid;

use crate::models::roadmap::{NodeDetailRow, RoadmapRow, RoadmapSummaryRow};
use crate::roadmap::models::{NodeDetail, RoadmapNode};

pub async fn insert_roadmap(
    pool: &MySqlPool,
    user_id: i64,
    job_title: &str,
    nodes: &[RoadmapNode],
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO roadmaps (id, user_id, job_title, nodes)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(job_title)
    .bind(Json(nodes))
    .execute(pool)
    .await?;

    info!(
        "Stored roadmap {} ({} nodes) for user {}",
        id,
        nodes.len(),
        user_id
    );
    Ok(id)
}

pub async fn list_roadmaps(
    pool: &MySqlPool,
    user_id: i64,
) -> Result<Vec<RoadmapSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, RoadmapSummaryRow>(
        "SELECT id, job_title, created_at FROM roadmaps WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_roadmap(pool: &MySqlPool, id: &str) -> Result<Option<RoadmapRow>, sqlx::Error> {
    sqlx::query_as::<_, RoadmapRow>(
        "SELECT id, user_id, job_title, nodes, created_at FROM roadmaps WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_node_details(
    pool: &MySqlPool,
    roadmap_id: &str,
) -> Result<Vec<NodeDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, NodeDetailRow>(
        r#"
        SELECT roadmap_id, node_id, detail, created_at
        FROM roadmap_node_details
        WHERE roadmap_id = ?
        ORDER BY node_id
        "#,
    )
    .bind(roadmap_id)
    .fetch_all(pool)
    .await
}

/// Stores `detail` for a node, replacing any earlier detail.
/// Relies on a unique key over (roadmap_id, node_id).
pub async fn upsert_node_detail(
    pool: &MySqlPool,
    roadmap_id: &str,
    node_id: i64,
    detail: &NodeDetail,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO roadmap_node_details (roadmap_id, node_id, detail)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE detail = VALUES(detail), created_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(roadmap_id)
    .bind(node_id)
    .bind(Json(detail))
    .execute(pool)
    .await?;

    Ok(())
}
