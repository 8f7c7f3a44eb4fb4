// All LLM prompt constants for the Roadmap module.

/// Exact text the model must return when it cannot honour the output rules.
pub const INVALID_SENTINEL: &str = "INVALID_ROADMAP";

/// Roadmap generation prompt template.
/// Replace: {job_title}, {interests}, {certificates}, {min_nodes}, {max_nodes}, {sentinel}
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"Design a career preparation roadmap for someone who wants to become: {job_title}

User interests: {interests}
Certificates already held: {certificates}

Return a JSON ARRAY of nodes with this EXACT schema (no extra fields):
[
  {
    "id": 1,
    "title": "{job_title}",
    "parentId": null,
    "isOptional": false,
    "category": "job",
    "duration": "total estimated preparation time"
  },
  {
    "id": 2,
    "title": "Foundation stage",
    "parentId": 1,
    "isOptional": false,
    "category": "stage",
    "duration": "3 months"
  }
]

HARD RULES:
1. Output the JSON array ONLY — no prose, no markdown, no code fences
2. Exactly ONE node has "parentId": null, and it is the "job" node with id 1
3. "category" is one of "job", "stage", "skill", "certificate"
4. "stage" nodes have the job node or another stage as parent
5. "skill" and "certificate" nodes have a stage or a skill as parent — never the job node directly
6. Every "parentId" must be the id of another node in the array; ids are unique integers
7. The tree must contain between {min_nodes} and {max_nodes} nodes in total
8. Certificates already held are still listed but marked "isOptional": true
9. "duration" is a short human-readable estimate such as "2 weeks" or "6 months"

If you cannot satisfy every rule above, respond with exactly {sentinel} and nothing else."#;

/// System prompt for node-detail enrichment — enforces a single JSON object.
pub const NODE_DETAIL_SYSTEM: &str = "You are a career mentor explaining one step of a \
    career roadmap. You MUST respond with a single valid JSON object only. \
    Do NOT use markdown code fences.";

/// Node-detail prompt template.
/// Replace: {job_title}, {node_title}, {category}, {duration}
pub const NODE_DETAIL_PROMPT_TEMPLATE: &str = r#"Target job: {job_title}
Roadmap step: {node_title} (category: {category}, planned duration: {duration})

Explain this step for someone preparing for the target job. Return a JSON object:
{
  "description": "what this step is and why it matters for the job",
  "learningSteps": ["concrete action 1", "concrete action 2"],
  "resources": ["book, course, exam body or website"],
  "estimatedDuration": "realistic time to complete"
}"#;
