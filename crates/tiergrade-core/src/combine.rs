//! Upgrade-only merge of a local verdict with an AI judgement.
//!
//! An automated judge may raise a tier the rule-based grader produced, but
//! never lower it. [`merge`] is the only place that policy lives and it
//! depends on nothing but the order of [`Tier`].

use std::cmp::Ordering;

use crate::results::{AiJudgement, Diagnostics, DualResult, GradeResult, Source};
use crate::tier::Tier;

/// Combine `local` with an optional AI judgement.
pub fn merge(local: &GradeResult, ai: Option<&AiJudgement>) -> DualResult {
    let Some((ai, ai_tier)) = ai.and_then(|j| j.usable_tier().map(|t| (j, t))) else {
        if let Some(error) = ai.and_then(|j| j.error.as_deref()) {
            tracing::debug!(%error, "AI judgement unusable, keeping local result");
        }
        return DualResult {
            result: local.clone(),
            source: Source::Local,
            local_tier: local.tier,
            ai_tier: None,
        };
    };

    match ai_tier.cmp(&local.tier) {
        Ordering::Greater => DualResult {
            result: GradeResult {
                tier: ai_tier,
                correct: ai_tier.is_correct(),
                feedback: non_empty(&ai.feedback).unwrap_or(local.feedback.as_str()).to_string(),
                matched: ai.matched.clone().unwrap_or_default(),
                missing: ai.missing.clone().unwrap_or_default(),
                diagnostics: Diagnostics::External,
                error: None,
            },
            source: Source::Ai,
            local_tier: local.tier,
            ai_tier: Some(ai_tier),
        },
        Ordering::Less => {
            tracing::debug!(local = %local.tier, ai = %ai_tier, "discarding lower AI tier");
            DualResult {
                result: local.clone(),
                source: Source::Local,
                local_tier: local.tier,
                ai_tier: Some(ai_tier),
            }
        }
        Ordering::Equal => DualResult {
            result: GradeResult {
                feedback: non_empty(&ai.feedback).unwrap_or(local.feedback.as_str()).to_string(),
                matched: union(&local.matched, ai.matched.as_deref().unwrap_or_default()),
                missing: ai.missing.clone().unwrap_or_else(|| local.missing.clone()),
                ..local.clone()
            },
            source: Source::Both,
            local_tier: local.tier,
            ai_tier: Some(ai_tier),
        },
    }
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|s| !s.trim().is_empty())
}

/// Ordered union: `a` first, then items of `b` not already present.
fn union(a: &[String], b: &[String]) -> Vec<String> {
    let mut out = a.to_vec();
    for id in b {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}
