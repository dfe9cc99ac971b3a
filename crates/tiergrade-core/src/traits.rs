//! The AI boundary.
//!
//! [`Adjudicator`] is implemented by the `tiergrade-providers` crate. The
//! core never decides when to call it for grading; callers obtain an
//! [`AiJudgement`] themselves and hand it to [`crate::combine::merge`].
//! Appeals go through [`crate::appeal::AppealProcessor`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdjudicatorError;
use crate::model::GradingContext;
use crate::results::{AiJudgement, GradeResult};
use crate::tier::Tier;

// ---------------------------------------------------------------------------
// Adjudicator trait
// ---------------------------------------------------------------------------

/// An external AI grader.
#[async_trait]
pub trait Adjudicator: Send + Sync {
    /// Human-readable backend name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Grade an answer independently of the local result.
    async fn judge(&self, request: &JudgeRequest) -> Result<AiJudgement, AdjudicatorError>;

    /// Decide an appeal against a prior verdict.
    async fn adjudicate(&self, request: &AppealRequest) -> Result<AppealDecision, AdjudicatorError>;
}

/// Request to grade an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeRequest {
    pub answer: String,
    /// The question text.
    pub question: String,
    /// The local tier, as a hint. Judges may disagree either way.
    pub local_score: Tier,
    #[serde(default)]
    pub context: GradingContext,
}

/// Request to decide an appeal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealRequest {
    pub answer: String,
    pub reasoning: String,
    pub prior_score: Tier,
    #[serde(default)]
    pub context: GradingContext,
}

impl AppealRequest {
    pub fn new(answer: &str, reasoning: &str, prior: &GradeResult, context: &GradingContext) -> Self {
        Self {
            answer: answer.to_string(),
            reasoning: reasoning.to_string(),
            prior_score: prior.tier,
            context: context.clone(),
        }
    }
}

/// An adjudicator's appeal decision, as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealDecision {
    #[serde(default)]
    pub score: Option<Tier>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub appeal_granted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppealDecision {
    /// The decided tier, or why the decision cannot be used.
    pub fn tier(&self) -> Result<Tier, AdjudicatorError> {
        if let Some(error) = &self.error {
            return Err(AdjudicatorError::Reported(error.clone()));
        }
        self.score.ok_or(AdjudicatorError::MissingScore)
    }
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Pull a JSON object out of a model reply.
///
/// Handles:
/// - ```json fenced blocks (preferred)
/// - generic ``` fenced blocks
/// - a bare object embedded in prose (first `{` to last `}`)
pub fn extract_json_object(reply: &str) -> Option<&str> {
    for fence in ["```json", "```JSON", "```"] {
        if let Some(start) = reply.find(fence) {
            let body = &reply[start + fence.len()..];
            let body = body.strip_prefix('\n').unwrap_or(body);
            let end = body.find("```").unwrap_or(body.len());
            let candidate = body[..end].trim();
            if candidate.starts_with('{') {
                return Some(candidate);
            }
        }
    }

    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}
