//! The `tiergrade appeal` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use uuid::Uuid;

use tiergrade_core::appeal::{AppealProcessor, APPEAL_FAILED};
use tiergrade_core::model::GradingContext;
use tiergrade_core::results::{AppealOutcome, GradeResult};
use tiergrade_core::{GradingEngine, Tier};
use tiergrade_providers::config::load_config_from;

pub struct AppealArgs {
    pub rules: PathBuf,
    pub question: String,
    pub answer: String,
    pub reasoning: String,
    pub prior: Option<PathBuf>,
    pub prior_tier: Option<Tier>,
    pub context: Vec<String>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: AppealArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let (_, question) = super::load_question(&args.rules, &args.question)?;
    let context = super::parse_context(&args.context)?;

    let prior = match (&args.prior, args.prior_tier) {
        (Some(path), _) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read prior result: {}", path.display()))?;
            serde_json::from_str::<GradeResult>(&content)
                .with_context(|| format!("failed to parse prior result: {}", path.display()))?
        }
        (None, Some(tier)) => GradeResult::new(tier, ""),
        (None, None) => GradingEngine::new(config.grading).evaluate(
            Some(&args.answer),
            &question.rule,
            &context,
        ),
    };

    let adjudicator = if config.appeals.enabled {
        config
            .default_adjudicator()
            .map_err(|e| tracing::warn!("appeal adjudicator unavailable: {e:#}"))
            .ok()
    } else {
        None
    };
    let processor = AppealProcessor::new(adjudicator, config.appeals.clone());

    let outcome = submit_within(&processor, &args.answer, &args.reasoning, &prior, &context).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Submit an appeal, keeping the prior tier if the adjudicator does not
/// answer within `appeals.timeout_secs`.
async fn submit_within(
    processor: &AppealProcessor,
    answer: &str,
    reasoning: &str,
    prior: &GradeResult,
    context: &GradingContext,
) -> AppealOutcome {
    let timeout = Duration::from_secs(processor.config().timeout_secs);
    let submitted = processor.submit_appeal(answer, reasoning, prior, context);
    match tokio::time::timeout(timeout, submitted).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!("appeal timed out after {}s", timeout.as_secs());
            AppealOutcome::rejected(Uuid::new_v4(), prior.tier, APPEAL_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tiergrade_core::appeal::AppealConfig;
    use tiergrade_core::traits::Adjudicator;

    use crate::commands::SlowAdjudicator;

    fn processor(delay: Duration) -> (Arc<SlowAdjudicator>, AppealProcessor) {
        let slow = Arc::new(SlowAdjudicator::new(delay));
        let config = AppealConfig {
            timeout_secs: 30,
            ..AppealConfig::default()
        };
        let adjudicator: Arc<dyn Adjudicator> = slow.clone();
        (slow, AppealProcessor::new(Some(adjudicator), config))
    }

    #[tokio::test(start_paused = true)]
    async fn appeal_timeout_keeps_prior_tier() {
        let (slow, processor) = processor(Duration::from_secs(120));
        let prior = GradeResult::new(Tier::Partial, "");

        let outcome = submit_within(
            &processor,
            "median 12",
            "I described the spread",
            &prior,
            &GradingContext::default(),
        )
        .await;

        assert_eq!(slow.calls(), 1);
        assert!(!outcome.accepted);
        assert!(!outcome.upgraded);
        assert_eq!(outcome.tier, Tier::Partial);
        assert_eq!(outcome.previous_tier, Tier::Partial);
        assert_eq!(outcome.error.as_deref(), Some(APPEAL_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn appeal_within_timeout_is_decided() {
        let (_, processor) = processor(Duration::from_secs(1));
        let prior = GradeResult::new(Tier::Partial, "");

        let outcome = submit_within(
            &processor,
            "median 12",
            "I described the spread",
            &prior,
            &GradingContext::default(),
        )
        .await;

        assert!(outcome.accepted);
        assert!(outcome.upgraded);
        assert_eq!(outcome.tier, Tier::Excellent);
    }
}
