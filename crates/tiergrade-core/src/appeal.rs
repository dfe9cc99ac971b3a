//! Student-initiated appeals.
//!
//! An appeal is checked locally first (reasoning present, adjudication
//! enabled) and only then forwarded, once, to the [`Adjudicator`]. Every
//! failure is folded into an [`AppealOutcome`] with `accepted: false` and the
//! prior tier standing; nothing is returned as an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::model::GradingContext;
use crate::results::{AppealOutcome, GradeResult};
use crate::traits::{Adjudicator, AppealRequest};

/// Rejection message for blank reasoning.
pub const MISSING_REASONING: &str = "Please provide reasoning for your appeal.";

/// Rejection message when adjudication is switched off or unavailable.
pub const APPEALS_UNAVAILABLE: &str = "AI appeals are not available.";

/// Message shown when the adjudicator fails.
pub const APPEAL_FAILED: &str =
    "Your appeal could not be processed right now. Your original score stands.";

/// Appeal settings, loadable from the `[appeals]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppealConfig {
    /// Whether appeals may be forwarded to an adjudicator at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Timeout callers should apply around [`AppealProcessor::submit_appeal`].
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AppealConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Validates appeals and forwards them to an adjudicator.
pub struct AppealProcessor {
    adjudicator: Option<Arc<dyn Adjudicator>>,
    config: AppealConfig,
}

impl AppealProcessor {
    pub fn new(adjudicator: Option<Arc<dyn Adjudicator>>, config: AppealConfig) -> Self {
        Self {
            adjudicator,
            config,
        }
    }

    /// A processor with no adjudicator; every valid appeal is rejected as
    /// unavailable.
    pub fn disabled() -> Self {
        Self::new(
            None,
            AppealConfig {
                enabled: false,
                ..Default::default()
            },
        )
    }

    pub fn config(&self) -> &AppealConfig {
        &self.config
    }

    /// Submit one appeal against `prior`.
    ///
    /// Makes at most one adjudicator call and never retries. A second appeal
    /// is a new call with `prior` set to the first outcome's verdict.
    #[instrument(skip_all, fields(prior = %prior.tier))]
    pub async fn submit_appeal(
        &self,
        answer: &str,
        reasoning: &str,
        prior: &GradeResult,
        context: &GradingContext,
    ) -> AppealOutcome {
        let appeal_id = Uuid::new_v4();

        if reasoning.trim().is_empty() {
            return AppealOutcome::rejected(appeal_id, prior.tier, MISSING_REASONING);
        }

        let adjudicator = match &self.adjudicator {
            Some(a) if self.config.enabled => a,
            _ => return AppealOutcome::rejected(appeal_id, prior.tier, APPEALS_UNAVAILABLE),
        };

        let request = AppealRequest::new(answer, reasoning, prior, context);
        let decided = adjudicator
            .adjudicate(&request)
            .await
            .and_then(|decision| decision.tier().map(|tier| (tier, decision)));

        match decided {
            Ok((tier, decision)) => {
                tracing::info!(
                    %appeal_id,
                    adjudicator = adjudicator.name(),
                    previous = %prior.tier,
                    decided = %tier,
                    granted = decision.appeal_granted,
                    "appeal decided"
                );
                AppealOutcome {
                    appeal_id,
                    accepted: true,
                    granted: decision.appeal_granted,
                    tier,
                    feedback: decision.feedback,
                    previous_tier: prior.tier,
                    upgraded: tier > prior.tier,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(%appeal_id, adjudicator = adjudicator.name(), "appeal failed: {e}");
                AppealOutcome::rejected(appeal_id, prior.tier, APPEAL_FAILED)
            }
        }
    }
}
