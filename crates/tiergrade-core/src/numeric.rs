//! Tolerance-based numeric comparison.

use crate::model::{Expected, GradingContext};
use crate::results::{Diagnostics, GradeResult};
use crate::tier::Tier;

/// Feedback for an answer that does not parse as a number.
pub const INVALID_NUMBER_FEEDBACK: &str = "Please enter a valid number.";

/// Feedback when the expected value cannot be resolved from the context.
pub const UNRESOLVED_FEEDBACK: &str = "This question could not be graded automatically.";

/// A numeric rule with its defaults already applied.
#[derive(Debug, Clone, Copy)]
pub struct NumericSettings {
    pub tolerance: f64,
    pub decimals: u32,
}

/// Keep only digits, `.` and `-`, then parse.
///
/// `"$1,234.50"` parses as `1234.5`; `"abc"` and `"1.2.3"` do not parse.
/// Unlike a leading-prefix parse, `"10-15"` is rejected rather than read as
/// `10`: an ambiguous answer asks for a valid number instead of being graded
/// on part of what was typed.
pub fn parse_answer(answer: &str) -> Option<f64> {
    let cleaned: String = answer
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `|value - expected| <= |expected| * tolerance`.
pub fn within_tolerance(value: f64, expected: f64, tolerance: f64) -> bool {
    (value - expected).abs() <= expected.abs() * tolerance
}

/// Grade a numeric answer.
pub fn compare_numeric(
    answer: &str,
    expected: &Expected,
    settings: NumericSettings,
    context: &GradingContext,
) -> GradeResult {
    let Some(submitted) = parse_answer(answer) else {
        return GradeResult::new(Tier::Insufficient, INVALID_NUMBER_FEEDBACK);
    };

    let Some(expected_value) = expected.resolve(context) else {
        tracing::warn!(?expected, "numeric rule has no resolvable expected value");
        return GradeResult::new(Tier::Insufficient, UNRESOLVED_FEEDBACK).with_diagnostics(
            Diagnostics::Unresolved {
                reason: format!("expected value {expected:?} not available in context"),
            },
        );
    };

    let tolerance = settings.tolerance.abs();
    let result = if within_tolerance(submitted, expected_value, tolerance) {
        GradeResult::new(Tier::Excellent, "Correct!")
    } else {
        GradeResult::new(
            Tier::Insufficient,
            format!(
                "Incorrect. The expected answer is {:.*}.",
                settings.decimals as usize, expected_value
            ),
        )
    };

    result.with_diagnostics(Diagnostics::Numeric {
        submitted,
        expected: expected_value,
        tolerance,
        difference: (submitted - expected_value).abs(),
    })
}
