//! Grading outcome types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tier::Tier;

/// Feedback returned for a blank answer.
pub const NO_ANSWER_FEEDBACK: &str = "No answer provided.";

/// The verdict for one answer against one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub tier: Tier,
    /// `true` exactly when `tier` is Excellent.
    pub correct: bool,
    pub feedback: String,
    /// Required rubric items the answer demonstrated, in rubric order.
    #[serde(default)]
    pub matched: Vec<String>,
    /// Required rubric items the answer did not demonstrate, in rubric order.
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub diagnostics: Diagnostics,
    /// Set when the result comes from a failed external call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GradeResult {
    pub fn new(tier: Tier, feedback: impl Into<String>) -> Self {
        Self {
            tier,
            correct: tier.is_correct(),
            feedback: feedback.into(),
            matched: Vec::new(),
            missing: Vec::new(),
            diagnostics: Diagnostics::Empty,
            error: None,
        }
    }

    pub fn with_items(mut self, matched: Vec<String>, missing: Vec<String>) -> Self {
        self.matched = matched;
        self.missing = missing;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The short-circuit result for a blank answer.
    pub fn no_answer(missing: Vec<String>) -> Self {
        Self::new(Tier::Insufficient, NO_ANSWER_FEEDBACK).with_items(Vec::new(), missing)
    }
}

/// Kind-specific details about how a verdict was reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostics {
    /// Nothing to report (blank answer, or unparseable input).
    #[default]
    Empty,
    Numeric {
        submitted: f64,
        expected: f64,
        tolerance: f64,
        difference: f64,
    },
    Exact {
        normalized_answer: String,
        normalized_expected: String,
    },
    Rubric {
        matched_count: u32,
        total_required: u32,
        excellent_min: u32,
        partial_min: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        forbidden_term: Option<String>,
        #[serde(default)]
        optional_matched: Vec<String>,
        #[serde(default)]
        optional_missing: Vec<String>,
    },
    /// The rule could not be applied in this context.
    Unresolved { reason: String },
    /// The verdict was produced by an external judge.
    External,
}

// ---------------------------------------------------------------------------
// AI judgement and dual results
// ---------------------------------------------------------------------------

/// A verdict from an external AI judge, as received.
///
/// Every field is optional because judges are free-form. A judgement with
/// no `score`, or with `error` set, carries no opinion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiJudgement {
    #[serde(default)]
    pub score: Option<Tier>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub matched: Option<Vec<String>>,
    #[serde(default)]
    pub missing: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AiJudgement {
    pub fn scored(score: Tier, feedback: &str) -> Self {
        Self {
            score: Some(score),
            feedback: Some(feedback.to_string()),
            ..Default::default()
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    /// The judge's tier, if the judgement is usable.
    pub fn usable_tier(&self) -> Option<Tier> {
        if self.error.is_some() {
            return None;
        }
        self.score
    }
}

/// Which grader a merged result's tier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    Ai,
    Both,
}

/// A merged verdict annotated with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualResult {
    #[serde(flatten)]
    pub result: GradeResult,
    pub source: Source,
    /// The rule-based tier, kept for audit.
    pub local_tier: Tier,
    /// The AI tier, recorded even when it was discarded.
    #[serde(default)]
    pub ai_tier: Option<Tier>,
}

impl DualResult {
    pub fn tier(&self) -> Tier {
        self.result.tier
    }
}

// ---------------------------------------------------------------------------
// Appeals
// ---------------------------------------------------------------------------

/// The outcome of one appeal submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppealOutcome {
    pub appeal_id: Uuid,
    /// The appeal was processed by an adjudicator.
    pub accepted: bool,
    /// The adjudicator sided with the student.
    pub granted: bool,
    pub tier: Tier,
    pub feedback: String,
    pub previous_tier: Tier,
    pub upgraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppealOutcome {
    /// An appeal that was not processed; the prior tier stands.
    pub fn rejected(appeal_id: Uuid, previous_tier: Tier, error: &str) -> Self {
        Self {
            appeal_id,
            accepted: false,
            granted: false,
            tier: previous_tier,
            feedback: String::new(),
            previous_tier,
            upgraded: false,
            error: Some(error.to_string()),
        }
    }
}
