pub mod appeal;
pub mod grade;
pub mod init;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use tiergrade_core::model::{GradingContext, Question, RuleSet};

/// Parse repeated `key=value` arguments into a grading context.
///
/// Values that read as JSON (numbers, booleans) keep their type; anything
/// else is stored as a string.
pub fn parse_context(pairs: &[String]) -> Result<GradingContext> {
    let mut context = GradingContext::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("context '{pair}' is not in KEY=VALUE form"))?;
        let key = key.trim();
        anyhow::ensure!(!key.is_empty(), "context '{pair}' has an empty key");
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .ok()
            .filter(|v| !v.is_object() && !v.is_array())
            .unwrap_or_else(|| serde_json::Value::String(raw.to_string()));
        context.insert(key, value);
    }
    Ok(context)
}

/// Load a rule set and look up one question in it.
pub fn load_question(rules: &Path, question_id: &str) -> Result<(RuleSet, Question)> {
    let mut set = tiergrade_core::parser::parse_rule_set(rules)?;
    let index = set
        .questions
        .iter()
        .position(|q| q.id == question_id)
        .with_context(|| {
            format!(
                "question '{question_id}' not found in rule set '{}'",
                set.id
            )
        })?;
    let question = set.questions.remove(index);
    Ok((set, question))
}

/// Adjudicator that sleeps before upgrading everything to Excellent.
#[cfg(test)]
pub(crate) struct SlowAdjudicator {
    delay: std::time::Duration,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl SlowAdjudicator {
    pub(crate) fn new(delay: std::time::Duration) -> Self {
        Self {
            delay,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl tiergrade_core::traits::Adjudicator for SlowAdjudicator {
    fn name(&self) -> &str {
        "slow"
    }

    async fn judge(
        &self,
        _request: &tiergrade_core::traits::JudgeRequest,
    ) -> Result<tiergrade_core::results::AiJudgement, tiergrade_core::error::AdjudicatorError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(tiergrade_core::results::AiJudgement::scored(
            tiergrade_core::Tier::Excellent,
            "Took a while.",
        ))
    }

    async fn adjudicate(
        &self,
        _request: &tiergrade_core::traits::AppealRequest,
    ) -> Result<tiergrade_core::traits::AppealDecision, tiergrade_core::error::AdjudicatorError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(tiergrade_core::traits::AppealDecision {
            score: Some(tiergrade_core::Tier::Excellent),
            feedback: "Took a while.".into(),
            appeal_granted: true,
            error: None,
        })
    }
}
