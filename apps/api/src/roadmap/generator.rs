//! Roadmap Generation — asks the LLM for a career roadmap tree and retries until
//! the reply is a valid tree or the attempt budget runs out.
//!
//! Per attempt: call LLM → strip fences → sentinel? → parse → validate tree.
//! Attempts are sequential and independent; nothing carries over between them.
//!
//! Node-detail enrichment shares the call/parse shape but never retries:
//! unparseable output is stored as free text instead.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, CAREER_PERSONA, JSON_ONLY_SYSTEM};
use crate::llm_client::{strip_json_fences, LlmBackend, PromptSegment};
use crate::roadmap::models::{
    validate_tree, NodeDetail, RoadmapNode, RoadmapRequest, StructuredDetail, TreeError,
};
use crate::roadmap::prompts::{
    INVALID_SENTINEL, NODE_DETAIL_PROMPT_TEMPLATE, NODE_DETAIL_SYSTEM, ROADMAP_PROMPT_TEMPLATE,
};

/// Retry budget and node-count bounds for roadmap generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadmapPolicy {
    pub max_attempts: u32,
    pub min_nodes: usize,
    pub max_nodes: usize,
}

impl Default for RoadmapPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_nodes: 50,
            max_nodes: 80,
        }
    }
}

/// What a single generation attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Accepted(Vec<RoadmapNode>),
    /// The model returned the sentinel instead of a roadmap.
    Declined,
    /// The reply was not a JSON node array.
    Malformed(String),
    /// The reply parsed but does not form a valid roadmap tree.
    InvalidTree(TreeError),
}

/// Classifies one raw model reply against the sentinel, the node schema and the tree invariant.
pub fn classify_attempt(raw: &str, policy: &RoadmapPolicy) -> AttemptOutcome {
    let cleaned = strip_json_fences(raw);

    if cleaned == INVALID_SENTINEL {
        return AttemptOutcome::Declined;
    }

    let nodes: Vec<RoadmapNode> = match serde_json::from_str(cleaned) {
        Ok(nodes) => nodes,
        Err(e) => return AttemptOutcome::Malformed(e.to_string()),
    };

    match validate_tree(&nodes, policy.min_nodes, policy.max_nodes) {
        Ok(()) => AttemptOutcome::Accepted(nodes),
        Err(e) => AttemptOutcome::InvalidTree(e),
    }
}

/// Generates a validated roadmap tree for `request.job_title`.
///
/// Soft failures (declined, malformed, invalid tree) consume one attempt each.
/// LLM transport errors end the loop immediately.
pub async fn generate_roadmap(
    llm: &dyn LlmBackend,
    request: &RoadmapRequest,
    policy: &RoadmapPolicy,
) -> Result<Vec<RoadmapNode>, AppError> {
    let job_title = request.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::Validation("jobTitle cannot be empty".to_string()));
    }

    let segments = build_roadmap_segments(request, policy);
    let mut last_raw = String::new();

    for attempt in 1..=policy.max_attempts {
        let raw = llm
            .complete(&segments)
            .await
            .map_err(|e| AppError::Llm(format!("Roadmap LLM call failed: {e}")))?;

        match classify_attempt(&raw, policy) {
            AttemptOutcome::Accepted(nodes) => {
                info!(
                    "Roadmap for '{}' accepted on attempt {}/{} with {} nodes",
                    job_title,
                    attempt,
                    policy.max_attempts,
                    nodes.len()
                );
                return Ok(nodes);
            }
            AttemptOutcome::Declined => warn!(
                "Roadmap attempt {}/{} declined: model returned the sentinel",
                attempt, policy.max_attempts
            ),
            AttemptOutcome::Malformed(reason) => warn!(
                "Roadmap attempt {}/{} malformed: {}",
                attempt, policy.max_attempts, reason
            ),
            AttemptOutcome::InvalidTree(reason) => warn!(
                "Roadmap attempt {}/{} invalid tree: {}",
                attempt, policy.max_attempts, reason
            ),
        }

        last_raw = raw;
    }

    Err(AppError::RoadmapGenerationFailed {
        attempts: policy.max_attempts,
        last_raw,
    })
}

fn build_roadmap_segments(request: &RoadmapRequest, policy: &RoadmapPolicy) -> Vec<PromptSegment> {
    let min_nodes = policy.min_nodes.to_string();
    let max_nodes = policy.max_nodes.to_string();
    let prompt = fill_template(
        ROADMAP_PROMPT_TEMPLATE,
        &[
            ("job_title", request.job_title.trim()),
            ("interests", or_none(request.interests.as_deref())),
            ("certificates", or_none(request.certificates.as_deref())),
            ("min_nodes", min_nodes.as_str()),
            ("max_nodes", max_nodes.as_str()),
            ("sentinel", INVALID_SENTINEL),
        ],
    );

    vec![
        PromptSegment::system(CAREER_PERSONA),
        PromptSegment::system(JSON_ONLY_SYSTEM),
        PromptSegment::user(prompt),
    ]
}

fn or_none(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("none")
}

/// Produces a detail explanation for one node. One LLM call, no retry:
/// a reply that is not a detail object is kept verbatim as free text.
pub async fn enrich_node(
    llm: &dyn LlmBackend,
    job_title: &str,
    node: &RoadmapNode,
) -> Result<NodeDetail, AppError> {
    let prompt = fill_template(
        NODE_DETAIL_PROMPT_TEMPLATE,
        &[
            ("job_title", job_title),
            ("node_title", node.title.as_str()),
            ("category", node.category.as_str()),
            ("duration", node.duration.as_str()),
        ],
    );

    let segments = vec![
        PromptSegment::system(CAREER_PERSONA),
        PromptSegment::system(NODE_DETAIL_SYSTEM),
        PromptSegment::user(prompt),
    ];

    let raw = llm
        .complete(&segments)
        .await
        .map_err(|e| AppError::Llm(format!("Node detail LLM call failed: {e}")))?;

    Ok(parse_node_detail(&raw))
}

fn parse_node_detail(raw: &str) -> NodeDetail {
    let cleaned = strip_json_fences(raw);
    match serde_json::from_str::<StructuredDetail>(cleaned) {
        Ok(detail) => NodeDetail::Structured(detail),
        Err(e) => {
            warn!("Node detail was not valid JSON ({e}); storing as free text");
            NodeDetail::FreeText {
                text: cleaned.to_string(),
            }
        }
    }
}
