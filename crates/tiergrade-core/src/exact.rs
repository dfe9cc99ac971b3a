//! Exact-match comparison.

use crate::numeric::UNRESOLVED_FEEDBACK;
use crate::results::{Diagnostics, GradeResult};
use crate::tier::Tier;

/// Lower-case, trim, and collapse whitespace runs to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Compare an answer against an expected literal, ignoring case and spacing.
///
/// A blank expected literal comes from a malformed rule and grades as
/// unresolved rather than quoting an empty answer back.
pub fn compare_exact(answer: &str, expected: &str) -> GradeResult {
    if expected.trim().is_empty() {
        tracing::warn!("exact rule has a blank expected value");
        return GradeResult::new(Tier::Insufficient, UNRESOLVED_FEEDBACK).with_diagnostics(
            Diagnostics::Unresolved {
                reason: "exact rule has no expected value".into(),
            },
        );
    }

    let normalized_answer = normalize(answer);
    let normalized_expected = normalize(expected);

    let result = if normalized_answer == normalized_expected {
        GradeResult::new(Tier::Excellent, "Correct!")
    } else {
        GradeResult::new(
            Tier::Insufficient,
            format!("Incorrect. The expected answer is \"{}\".", expected.trim()),
        )
    };

    result.with_diagnostics(Diagnostics::Exact {
        normalized_answer,
        normalized_expected,
    })
}
