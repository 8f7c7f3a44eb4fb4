//! Roadmap data model and the tree invariant every accepted roadmap satisfies.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of a roadmap node. The root is always the target job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Job,
    Stage,
    Skill,
    Certificate,
}

impl NodeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeCategory::Job => "job",
            NodeCategory::Stage => "stage",
            NodeCategory::Skill => "skill",
            NodeCategory::Certificate => "certificate",
        }
    }
}

/// A single node of a career roadmap tree, in the JSON shape the model emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapNode {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
    pub is_optional: bool,
    pub category: NodeCategory,
    pub duration: String,
}

/// Request body for roadmap generation. The owner comes from the session token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapRequest {
    pub job_title: String,
    pub interests: Option<String>,
    pub certificates: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("roadmap has {count} nodes, expected between {min} and {max}")]
    NodeCount { count: usize, min: usize, max: usize },

    #[error("node id {0} appears more than once")]
    DuplicateId(i64),

    #[error("expected exactly one root node, found {0}")]
    RootCount(usize),

    #[error("root node {0} is not a job node")]
    RootNotJob(i64),

    #[error("node {0} is a job node but not the root")]
    StrayJob(i64),

    #[error("node {id} points at missing parent {parent_id}")]
    MissingParent { id: i64, parent_id: i64 },

    #[error("{0} nodes are not reachable from the root (cycle)")]
    Unreachable(usize),
}

/// Checks that `nodes` form a single rooted tree with a job root and a node
/// count inside `[min_nodes, max_nodes]`.
pub fn validate_tree(
    nodes: &[RoadmapNode],
    min_nodes: usize,
    max_nodes: usize,
) -> Result<(), TreeError> {
    if nodes.len() < min_nodes || nodes.len() > max_nodes {
        return Err(TreeError::NodeCount {
            count: nodes.len(),
            min: min_nodes,
            max: max_nodes,
        });
    }

    let mut ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(node.id) {
            return Err(TreeError::DuplicateId(node.id));
        }
    }

    let roots: Vec<&RoadmapNode> = nodes.iter().filter(|n| n.parent_id.is_none()).collect();
    if roots.len() != 1 {
        return Err(TreeError::RootCount(roots.len()));
    }
    let root = roots[0];
    if root.category != NodeCategory::Job {
        return Err(TreeError::RootNotJob(root.id));
    }

    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for node in nodes {
        let Some(parent_id) = node.parent_id else {
            continue;
        };
        if node.category == NodeCategory::Job {
            return Err(TreeError::StrayJob(node.id));
        }
        if !ids.contains(&parent_id) {
            return Err(TreeError::MissingParent {
                id: node.id,
                parent_id,
            });
        }
        children.entry(parent_id).or_default().push(node.id);
    }

    // Every node has one parent, so full reachability from the root rules out cycles.
    let mut reached = 0usize;
    let mut stack = vec![root.id];
    while let Some(id) = stack.pop() {
        reached += 1;
        if let Some(kids) = children.get(&id) {
            stack.extend(kids);
        }
    }
    if reached != nodes.len() {
        return Err(TreeError::Unreachable(nodes.len() - reached));
    }

    Ok(())
}

/// Structured enrichment of a single roadmap node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDetail {
    pub description: String,
    #[serde(default)]
    pub learning_steps: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub estimated_duration: Option<String>,
}

/// Node detail as stored and returned. Unparseable model output is kept as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum NodeDetail {
    Structured(StructuredDetail),
    FreeText { text: String },
}


#[cfg(test)]
mod tests {
    use super::fixtures::{node, tree};
    use super::*;

    #[test]
    fn test_valid_tree_passes() {
        let nodes = tree(60);
        assert_eq!(nodes.len(), 60);
        assert_eq!(validate_tree(&nodes, 50, 80), Ok(()));
    }

    #[test]
    fn test_node_count_bounds() {
        assert!(matches!(
            validate_tree(&tree(10), 50, 80),
            Err(TreeError::NodeCount { count: 10, .. })
        ));
        assert!(matches!(
            validate_tree(&tree(81), 50, 80),
            Err(TreeError::NodeCount { count: 81, .. })
        ));
        assert_eq!(validate_tree(&tree(50), 50, 80), Ok(()));
        assert_eq!(validate_tree(&tree(80), 50, 80), Ok(()));
    }

    #[test]
    fn test_two_roots_rejected() {
        let mut nodes = tree(6);
        nodes.push(node(99, None, NodeCategory::Job));
        assert_eq!(validate_tree(&nodes, 1, 100), Err(TreeError::RootCount(2)));
    }

    #[test]
    fn test_no_root_rejected() {
        let nodes = vec![
            node(1, Some(2), NodeCategory::Stage),
            node(2, Some(1), NodeCategory::Stage),
        ];
        assert_eq!(validate_tree(&nodes, 1, 100), Err(TreeError::RootCount(0)));
    }

    #[test]
    fn test_root_must_be_job() {
        let nodes = vec![
            node(1, None, NodeCategory::Stage),
            node(2, Some(1), NodeCategory::Skill),
        ];
        assert_eq!(validate_tree(&nodes, 1, 100), Err(TreeError::RootNotJob(1)));
    }

    #[test]
    fn test_job_below_root_rejected() {
        let mut nodes = tree(5);
        nodes.push(node(50, Some(2), NodeCategory::Job));
        assert_eq!(validate_tree(&nodes, 1, 100), Err(TreeError::StrayJob(50)));
    }

    #[test]
    fn test_missing_parent_rejected() {
        let mut nodes = tree(5);
        nodes.push(node(50, Some(404), NodeCategory::Skill));
        assert_eq!(
            validate_tree(&nodes, 1, 100),
            Err(TreeError::MissingParent {
                id: 50,
                parent_id: 404
            })
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut nodes = tree(5);
        nodes.push(node(2, Some(1), NodeCategory::Stage));
        assert_eq!(validate_tree(&nodes, 1, 100), Err(TreeError::DuplicateId(2)));
    }

    #[test]
    fn test_cycle_detached_from_root_rejected() {
        let mut nodes = tree(4);
        nodes.push(node(10, Some(11), NodeCategory::Skill));
        nodes.push(node(11, Some(10), NodeCategory::Skill));
        assert_eq!(validate_tree(&nodes, 1, 100), Err(TreeError::Unreachable(2)));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let mut nodes = tree(4);
        nodes.push(node(10, Some(10), NodeCategory::Skill));
        assert_eq!(validate_tree(&nodes, 1, 100), Err(TreeError::Unreachable(1)));
    }

    #[test]
    fn test_node_json_uses_camel_case() {
        let json = r#"{"id": 2, "title": "기초 프로그래밍", "parentId": 1,
            "isOptional": true, "category": "stage", "duration": "3개월"}"#;
        let parsed: RoadmapNode = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.parent_id, Some(1));
        assert!(parsed.is_optional);
        assert_eq!(parsed.category, NodeCategory::Stage);
    }

    #[test]
    fn test_unknown_category_fails_to_parse() {
        let json = r#"{"id": 2, "title": "x", "parentId": 1,
            "isOptional": false, "category": "hobby", "duration": ""}"#;
        assert!(serde_json::from_str::<RoadmapNode>(json).is_err());
    }

    #[test]
    fn test_node_detail_is_tagged_by_format() {
        let detail = NodeDetail::FreeText {
            text: "raw".to_string(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["format"], "free_text");
        assert_eq!(json["text"], "raw");
    }
}
