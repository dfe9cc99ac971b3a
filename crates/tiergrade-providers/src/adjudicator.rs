//! LLM-backed judge and appeal adjudicator.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tiergrade_core::error::AdjudicatorError;
use tiergrade_core::results::AiJudgement;
use tiergrade_core::traits::{
    extract_json_object, Adjudicator, AppealDecision, AppealRequest, JudgeRequest,
};

use crate::backend::{CompletionBackend, CompletionRequest};

const DEFAULT_MAX_TOKENS: u32 = 1024;

const JUDGE_SYSTEM_PROMPT: &str = "You are a careful teaching assistant grading short student answers. \
Grade on a three-tier scale: E (excellent, fully correct), P (partial, on the right track but incomplete), \
I (insufficient). Reply with a single JSON object and nothing else.";

const APPEAL_SYSTEM_PROMPT: &str = "You are a fair teaching assistant reviewing a student's appeal of an \
automated grade. Consider the student's reasoning on its merits. Reply with a single JSON object and nothing else.";

/// An [`Adjudicator`] that prompts a chat model and parses its JSON reply.
pub struct LlmAdjudicator<B> {
    backend: B,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl<B: CompletionBackend> LlmAdjudicator<B> {
    pub fn new(backend: B, model: &str) -> Self {
        Self {
            backend,
            model: model.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    async fn ask<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        prompt: String,
    ) -> Result<T, AdjudicatorError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: system_prompt.to_string(),
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let reply = self.backend.complete(&request).await?;
        debug!(backend = self.backend.name(), len = reply.len(), "received reply");

        let json = extract_json_object(&reply)
            .ok_or_else(|| AdjudicatorError::MalformedResponse("no JSON object in reply".into()))?;
        serde_json::from_str(json).map_err(|e| AdjudicatorError::MalformedResponse(e.to_string()))
    }
}

fn render_context(request_context: &serde_json::Map<String, serde_json::Value>) -> String {
    if request_context.is_empty() {
        return "(none)".to_string();
    }
    serde_json::to_string_pretty(request_context).unwrap_or_else(|_| "(unavailable)".to_string())
}

fn judge_prompt(request: &JudgeRequest) -> String {
    format!(
        "Question:\n{question}\n\n\
         Context:\n{context}\n\n\
         Student answer:\n{answer}\n\n\
         An automated rule-based grader scored this answer \"{local}\". \
         You may agree or disagree.\n\n\
         Respond with JSON of the form:\n\
         {{\"score\": \"E\" | \"P\" | \"I\", \"feedback\": \"one or two sentences for the student\", \
         \"matched\": [\"concepts present\"], \"missing\": [\"concepts absent\"]}}",
        question = request.question,
        context = render_context(request.context.as_map()),
        answer = request.answer,
        local = request.local_score.code(),
    )
}

fn appeal_prompt(request: &AppealRequest) -> String {
    format!(
        "Context:\n{context}\n\n\
         Student answer:\n{answer}\n\n\
         Score received: \"{prior}\"\n\n\
         The student's reasoning for an appeal:\n{reasoning}\n\n\
         Respond with JSON of the form:\n\
         {{\"score\": \"E\" | \"P\" | \"I\", \"feedback\": \"explanation for the student\", \
         \"appealGranted\": true | false}}",
        context = render_context(request.context.as_map()),
        answer = request.answer,
        prior = request.prior_score.code(),
        reasoning = request.reasoning,
    )
}

#[async_trait]
impl<B: CompletionBackend> Adjudicator for LlmAdjudicator<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(skip_all, fields(backend = self.backend.name(), model = %self.model))]
    async fn judge(&self, request: &JudgeRequest) -> Result<AiJudgement, AdjudicatorError> {
        self.ask(JUDGE_SYSTEM_PROMPT, judge_prompt(request)).await
    }

    #[instrument(skip_all, fields(backend = self.backend.name(), model = %self.model))]
    async fn adjudicate(&self, request: &AppealRequest) -> Result<AppealDecision, AdjudicatorError> {
        self.ask(APPEAL_SYSTEM_PROMPT, appeal_prompt(request)).await
    }
}
