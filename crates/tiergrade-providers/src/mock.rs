//! Mock adjudicator for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tiergrade_core::error::AdjudicatorError;
use tiergrade_core::results::AiJudgement;
use tiergrade_core::traits::{Adjudicator, AppealDecision, AppealRequest, JudgeRequest};
use tiergrade_core::Tier;

/// A mock adjudicator for exercising the AI paths without real API calls.
///
/// Returns the same judgement and appeal decision every time, or fails every
/// call when built with [`MockAdjudicator::unavailable`].
pub struct MockAdjudicator {
    judgement: AiJudgement,
    decision: AppealDecision,
    failure: Option<String>,
    /// Number of calls made, judge and appeal combined.
    call_count: AtomicU32,
    last_judge_request: Mutex<Option<JudgeRequest>>,
    last_appeal_request: Mutex<Option<AppealRequest>>,
}

impl MockAdjudicator {
    pub fn new(judgement: AiJudgement, decision: AppealDecision) -> Self {
        Self {
            judgement,
            decision,
            failure: None,
            call_count: AtomicU32::new(0),
            last_judge_request: Mutex::new(None),
            last_appeal_request: Mutex::new(None),
        }
    }

    /// Judge and decide appeals with the same tier.
    pub fn with_fixed_score(score: Tier, feedback: &str) -> Self {
        let decision = AppealDecision {
            score: Some(score),
            feedback: feedback.to_string(),
            appeal_granted: true,
            error: None,
        };
        Self::new(AiJudgement::scored(score, feedback), decision)
    }

    /// Fail every call as if the service were down.
    pub fn unavailable(reason: &str) -> Self {
        let mut mock = Self::new(AiJudgement::default(), AppealDecision::default());
        mock.failure = Some(reason.to_string());
        mock
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_judge_request(&self) -> Option<JudgeRequest> {
        self.last_judge_request.lock().unwrap().clone()
    }

    pub fn last_appeal_request(&self) -> Option<AppealRequest> {
        self.last_appeal_request.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), AdjudicatorError> {
        match &self.failure {
            Some(reason) => Err(AdjudicatorError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Adjudicator for MockAdjudicator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn judge(&self, request: &JudgeRequest) -> Result<AiJudgement, AdjudicatorError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_judge_request.lock().unwrap() = Some(request.clone());
        self.check_failure()?;
        Ok(self.judgement.clone())
    }

    async fn adjudicate(&self, request: &AppealRequest) -> Result<AppealDecision, AdjudicatorError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_appeal_request.lock().unwrap() = Some(request.clone());
        self.check_failure()?;
        Ok(self.decision.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tiergrade_core::appeal::{AppealConfig, AppealProcessor};
    use tiergrade_core::combine::merge;
    use tiergrade_core::model::GradingContext;
    use tiergrade_core::results::{GradeResult, Source};

    #[tokio::test]
    async fn fixed_score() {
        let mock = MockAdjudicator::with_fixed_score(Tier::Excellent, "Well argued.");
        let request = JudgeRequest {
            answer: "42".into(),
            question: "What is six times seven?".into(),
            local_score: Tier::Insufficient,
            context: GradingContext::new(),
        };

        let judgement = mock.judge(&request).await.unwrap();
        assert_eq!(judgement.usable_tier(), Some(Tier::Excellent));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_judge_request().unwrap().answer, "42");

        let merged = merge(&GradeResult::new(Tier::Insufficient, "no"), Some(&judgement));
        assert_eq!(merged.tier(), Tier::Excellent);
        assert_eq!(merged.source, Source::Ai);
    }

    #[tokio::test]
    async fn unavailable_leaves_appeal_prior_standing() {
        let mock = Arc::new(MockAdjudicator::unavailable("connection refused"));
        let processor = AppealProcessor::new(Some(mock.clone()), AppealConfig::default());
        let prior = GradeResult::new(Tier::Partial, "Good start.");

        let outcome = processor
            .submit_appeal("answer", "I covered it", &prior, &GradingContext::new())
            .await;
        assert!(!outcome.accepted);
        assert_eq!(outcome.tier, Tier::Partial);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(
            mock.last_appeal_request().unwrap().reasoning,
            "I covered it"
        );
    }

    #[tokio::test]
    async fn blank_reasoning_never_reaches_adjudicator() {
        let mock = Arc::new(MockAdjudicator::with_fixed_score(Tier::Excellent, "ok"));
        let processor = AppealProcessor::new(Some(mock.clone()), AppealConfig::default());
        let outcome = processor
            .submit_appeal(
                "answer",
                "   ",
                &GradeResult::new(Tier::Insufficient, "no"),
                &GradingContext::new(),
            )
            .await;
        assert!(!outcome.accepted);
        assert_eq!(mock.call_count(), 0);
    }
}
