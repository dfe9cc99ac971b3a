//! Grading engine orchestrator.
//!
//! Applies the blank-answer short-circuit, then dispatches on the rule kind
//! to the rubric, numeric, or exact comparator.

use serde::{Deserialize, Serialize};

use crate::exact::compare_exact;
use crate::model::{GradingContext, GradingRule};
use crate::numeric::{compare_numeric, NumericSettings};
use crate::results::GradeResult;
use crate::rubric::match_rubric;

/// Engine-level defaults for rules that leave them unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Relative tolerance for numeric rules.
    #[serde(default = "default_tolerance")]
    pub default_tolerance: f64,
    /// Decimals shown in numeric feedback.
    #[serde(default = "default_decimals")]
    pub default_decimals: u32,
}

fn default_tolerance() -> f64 {
    0.01
}

fn default_decimals() -> u32 {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_tolerance: default_tolerance(),
            default_decimals: default_decimals(),
        }
    }
}

/// The grading engine. Stateless apart from its defaults; `evaluate` is
/// pure and can be called concurrently.
#[derive(Debug, Clone, Default)]
pub struct GradingEngine {
    config: EngineConfig,
}

impl GradingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Grade one answer against one rule.
    pub fn evaluate(
        &self,
        answer: Option<&str>,
        rule: &GradingRule,
        context: &GradingContext,
    ) -> GradeResult {
        let answer = match answer {
            Some(a) if !a.trim().is_empty() => a,
            _ => {
                tracing::debug!(kind = %rule.kind(), "blank answer");
                return GradeResult::no_answer(rule.required_item_ids(context));
            }
        };

        let result = match rule {
            GradingRule::Numeric {
                expected,
                tolerance,
                decimals,
            } => compare_numeric(
                answer,
                expected,
                NumericSettings {
                    tolerance: tolerance.unwrap_or(self.config.default_tolerance),
                    decimals: decimals.unwrap_or(self.config.default_decimals),
                },
                context,
            ),
            GradingRule::Exact { expected } => compare_exact(answer, expected),
            GradingRule::Pattern {
                rubric,
                forbidden,
                scoring,
            } => match_rubric(answer, rubric, forbidden, scoring, context),
        };

        tracing::debug!(kind = %rule.kind(), tier = %result.tier, "answer evaluated");
        result
    }
}
