// Career roadmaps: validated LLM generation, node enrichment and storage.
// All LLM calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod store;
