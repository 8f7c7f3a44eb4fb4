use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A stored roadmap. `nodes` is the accepted node array, kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapRow {
    pub id: String,
    pub user_id: i64,
    pub job_title: String,
    pub nodes: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSummaryRow {
    pub id: String,
    pub job_title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetailRow {
    pub roadmap_id: String,
    pub node_id: i64,
    pub detail: Value,
    pub created_at: DateTime<Utc>,
}
