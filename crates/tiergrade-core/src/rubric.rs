//! Rubric matching for free-text answers.
//!
//! Each required rubric item that applies in the grading context is tested
//! against the answer; the number of matched items decides the tier through
//! the rule's thresholds. Any forbidden pattern overrides the tally.

use crate::model::{GradingContext, RubricItem, Scoring};
use crate::pattern::Pattern;
use crate::results::{Diagnostics, GradeResult};
use crate::tier::Tier;

/// Feedback for an answer that covers every required element.
pub const EXCELLENT_FEEDBACK: &str = "Excellent! Your answer covers all the key elements.";

/// Missing items named in feedback, at most.
const MAX_HINTS: usize = 3;

/// Grade a free-text answer against a rubric.
pub fn match_rubric(
    answer: &str,
    rubric: &[RubricItem],
    forbidden: &[Pattern],
    scoring: &Scoring,
    context: &GradingContext,
) -> GradeResult {
    let text = answer.to_lowercase();

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    let mut optional_matched = Vec::new();
    let mut optional_missing = Vec::new();

    for item in rubric.iter().filter(|item| item.applies(context)) {
        let hit = item.matches(&text);
        let bucket = match (item.required, hit) {
            (true, true) => &mut matched,
            (true, false) => &mut missing,
            (false, true) => &mut optional_matched,
            (false, false) => &mut optional_missing,
        };
        bucket.push(item.id.clone());
    }

    let matched_count = matched.len() as u32;
    let total_required = matched_count + missing.len() as u32;
    let (excellent_min, partial_min) = scoring.resolve(total_required);

    let forbidden_term = forbidden
        .iter()
        .find_map(|p| p.find(&text))
        .map(str::to_string);

    let (tier, feedback) = if let Some(term) = &forbidden_term {
        (
            Tier::Insufficient,
            format!("Your answer includes an incorrect statement: \"{term}\"."),
        )
    } else if matched_count >= excellent_min {
        (Tier::Excellent, EXCELLENT_FEEDBACK.to_string())
    } else if matched_count >= partial_min {
        (
            Tier::Partial,
            format!("Good start. To improve, address: {}.", hints(&missing)),
        )
    } else {
        (
            Tier::Insufficient,
            format!("Your answer is missing key elements: {}.", hints(&missing)),
        )
    };

    tracing::trace!(
        matched_count,
        total_required,
        excellent_min,
        partial_min,
        %tier,
        "rubric evaluated"
    );

    GradeResult::new(tier, feedback)
        .with_items(matched, missing)
        .with_diagnostics(Diagnostics::Rubric {
            matched_count,
            total_required,
            excellent_min,
            partial_min,
            forbidden_term,
            optional_matched,
            optional_missing,
        })
}

fn hints(missing: &[String]) -> String {
    missing
        .iter()
        .take(MAX_HINTS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
