//! The `tiergrade grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use tiergrade_core::combine::merge;
use tiergrade_core::model::{GradingContext, Question};
use tiergrade_core::results::{AiJudgement, DualResult, GradeResult};
use tiergrade_core::traits::{Adjudicator, JudgeRequest};
use tiergrade_core::GradingEngine;
use tiergrade_providers::config::load_config_from;

pub struct GradeArgs {
    pub rules: PathBuf,
    pub question: String,
    pub answer: Option<String>,
    pub answer_file: Option<PathBuf>,
    pub context: Vec<String>,
    pub ai: bool,
    pub format: String,
    pub config: Option<PathBuf>,
}

#[derive(Serialize)]
struct GradeOutput<'a> {
    question: &'a str,
    #[serde(flatten)]
    result: &'a DualResult,
    graded_at: DateTime<Utc>,
}

pub async fn execute(args: GradeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let (_, question) = super::load_question(&args.rules, &args.question)?;
    let context = super::parse_context(&args.context)?;

    let answer = match &args.answer_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read answer file: {}", path.display()))?,
        ),
        None => args.answer.clone(),
    };

    let engine = GradingEngine::new(config.grading);
    let local = engine.evaluate(answer.as_deref(), &question.rule, &context);

    let answered = answer.as_deref().is_some_and(|a| !a.trim().is_empty());
    let judgement = if args.ai && answered {
        match config.default_adjudicator() {
            Ok(adjudicator) => {
                let timeout = Duration::from_secs(config.judge_timeout_secs);
                ask_judge(adjudicator, &question, answer.as_deref(), &local, &context, timeout).await
            }
            Err(e) => {
                tracing::warn!("AI judge unavailable, using local grade: {e:#}");
                None
            }
        }
    } else {
        if args.ai {
            tracing::debug!("blank answer, skipping AI judge");
        }
        None
    };

    let dual = merge(&local, judgement.as_ref());

    match args.format.as_str() {
        "json" => {
            let output = GradeOutput {
                question: &question.id,
                result: &dual,
                graded_at: Utc::now(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => print_result(&question, &dual),
    }

    Ok(())
}

async fn ask_judge(
    adjudicator: Arc<dyn Adjudicator>,
    question: &Question,
    answer: Option<&str>,
    local: &GradeResult,
    context: &GradingContext,
    timeout: Duration,
) -> Option<AiJudgement> {
    let request = JudgeRequest {
        answer: answer.unwrap_or_default().to_string(),
        question: question.prompt.clone(),
        local_score: local.tier,
        context: context.clone(),
    };

    match tokio::time::timeout(timeout, adjudicator.judge(&request)).await {
        Ok(Ok(judgement)) => Some(judgement),
        Ok(Err(e)) => {
            tracing::warn!(adjudicator = adjudicator.name(), "AI judge failed, using local grade: {e}");
            None
        }
        Err(_) => {
            tracing::warn!(
                adjudicator = adjudicator.name(),
                "AI judge timed out after {}s, using local grade",
                timeout.as_secs()
            );
            None
        }
    }
}

fn print_result(question: &Question, dual: &DualResult) {
    use comfy_table::{Cell, Table};

    let result = &dual.result;
    let mut table = Table::new();
    table.set_header(vec!["Question", "Tier", "Correct", "Source", "Matched", "Missing"]);
    table.add_row(vec![
        Cell::new(&question.id),
        Cell::new(result.tier),
        Cell::new(if result.correct { "yes" } else { "no" }),
        Cell::new(format!("{:?}", dual.source).to_lowercase()),
        Cell::new(result.matched.join(", ")),
        Cell::new(result.missing.join(", ")),
    ]);

    println!("{table}");
    println!("\n{}", result.feedback);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SlowAdjudicator;
    use tiergrade_core::model::GradingRule;
    use tiergrade_core::results::Source;
    use tiergrade_core::{EngineConfig, Tier};

    fn capital() -> Question {
        Question {
            id: "capital".into(),
            prompt: "What is the capital of France?".into(),
            rule: GradingRule::exact("Paris"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn judge_timeout_keeps_local_tier() {
        let question = capital();
        let context = GradingContext::default();
        let local = GradingEngine::new(EngineConfig::default()).evaluate(
            Some("Lyon"),
            &question.rule,
            &context,
        );
        assert_eq!(local.tier, Tier::Insufficient);

        let slow = Arc::new(SlowAdjudicator::new(Duration::from_secs(60)));
        let judgement = ask_judge(
            slow.clone(),
            &question,
            Some("Lyon"),
            &local,
            &context,
            Duration::from_secs(5),
        )
        .await;
        assert!(judgement.is_none());
        assert_eq!(slow.calls(), 1);

        let dual = merge(&local, judgement.as_ref());
        assert_eq!(dual.tier(), Tier::Insufficient);
        assert_eq!(dual.source, Source::Local);
    }

    #[tokio::test(start_paused = true)]
    async fn judge_within_timeout_is_returned() {
        let question = capital();
        let context = GradingContext::default();
        let local = GradeResult::new(Tier::Insufficient, "");

        let slow = Arc::new(SlowAdjudicator::new(Duration::from_secs(1)));
        let judgement = ask_judge(
            slow,
            &question,
            Some("Lyon"),
            &local,
            &context,
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(judgement.and_then(|j| j.score), Some(Tier::Excellent));
    }
}
