//! One mentor chat turn: persona + optional profile + recent history + new message.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::CAREER_PERSONA;
use crate::llm_client::{LlmBackend, PromptSegment, Role};

/// Oldest turns beyond this are dropped before calling the model.
pub const MAX_HISTORY_TURNS: usize = 20;

const MENTOR_GUIDANCE: &str = "Answer as a mentor in a conversation, not as a report. \
    Keep replies under 200 words unless the user asks for detail. \
    When the user is unsure what they want, ask one clarifying question. \
    Recommend concrete next steps such as certificates, courses or portfolio work.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// What the user told us about themselves, if anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfile {
    pub desired_job: Option<String>,
    pub interests: Option<String>,
    pub certificates: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
    pub profile: Option<MentorProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub reply: String,
}

pub async fn chat_turn(llm: &dyn LlmBackend, request: &ChatRequest) -> Result<String, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let segments = build_segments(request);
    let reply = llm
        .complete(&segments)
        .await
        .map_err(|e| AppError::Llm(format!("Mentor chat LLM call failed: {e}")))?;

    Ok(reply.trim().to_string())
}

fn build_segments(request: &ChatRequest) -> Vec<PromptSegment> {
    let mut segments = vec![
        PromptSegment::system(CAREER_PERSONA),
        PromptSegment::system(MENTOR_GUIDANCE),
    ];

    if let Some(profile) = request.profile.as_ref().and_then(describe_profile) {
        segments.push(PromptSegment::system(profile));
    }

    let skip = request.history.len().saturating_sub(MAX_HISTORY_TURNS);
    segments.extend(
        request
            .history
            .iter()
            .skip(skip)
            // system turns from the client are not trusted
            .filter(|t| t.role != Role::System && !t.content.trim().is_empty())
            .map(|t| PromptSegment {
                role: t.role,
                content: t.content.clone(),
            }),
    );

    segments.push(PromptSegment::user(request.message.trim()));
    segments
}

fn describe_profile(profile: &MentorProfile) -> Option<String> {
    let lines: Vec<String> = [
        ("Desired job", &profile.desired_job),
        ("Interests", &profile.interests),
        ("Certificates held", &profile.certificates),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| format!("{label}: {v}"))
    })
    .collect();

    if lines.is_empty() {
        None
    } else {
        Some(format!("About the user:\n{}", lines.join("\n")))
    }
}
