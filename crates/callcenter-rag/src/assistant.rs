//! Question answering pipeline that ties routing, retrieval and generation together.

use anyhow::Result;
use rand::RngCore;

use crate::config::{AssistantConfig, ConfigError};
use crate::llm::Generator;
use crate::rag::gate::{
    RetrievalDecision, Route, SmalltalkReplies, GENERATION_FAILED_MESSAGE, KHMER_REDIRECT_MESSAGE,
    KHMER_SNIPPET, LOW_CONFIDENCE_ANSWER, NO_CONTEXT_SNIPPET, SMALLTALK_SNIPPET,
};
use crate::rag::lexical::{has_khmer_script, Vocabulary};
use crate::rag::prompt::{build_history_prefix, build_prompt};
use crate::rag::{FollowupDetector, Intent, IntentClassifier, RetrievalQuery};
use crate::retriever::Retriever;
use crate::types::{AssistantReply, Retrieval, Turn};

/// Fixed per-process pipeline parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub top_k: usize,
    pub low_confidence_threshold: f32,
    pub max_history_turns: usize,
    pub temperature: f32,
}

impl From<&AssistantConfig> for PipelineSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            low_confidence_threshold: config.retrieval.low_confidence_threshold,
            max_history_turns: config.memory.max_history_turns,
            temperature: config.generation.temperature,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

/// Call-center question answering: routes each question, retrieves context,
/// and either synthesizes an answer or returns the low-confidence fallback.
///
/// Collaborators are injected once and reused for every turn. History is
/// owned by the caller and only read.
pub struct CallCenterAssistant<R, G> {
    retriever: R,
    generator: G,
    classifier: IntentClassifier,
    followup: FollowupDetector,
    replies: SmalltalkReplies,
    settings: PipelineSettings,
}

impl<R: Retriever, G: Generator> CallCenterAssistant<R, G> {
    /// Fails when `config` does not pass [`AssistantConfig::validate`].
    pub fn new(retriever: R, generator: G, config: &AssistantConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            retriever,
            generator,
            classifier: IntentClassifier::default(),
            followup: FollowupDetector::default(),
            replies: SmalltalkReplies::default(),
            settings: PipelineSettings::from(config),
        })
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.classifier = IntentClassifier::new(vocabulary);
        self
    }

    pub fn with_followup_detector(mut self, detector: FollowupDetector) -> Self {
        self.followup = detector;
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.replies = SmalltalkReplies::with_rng(rng);
        self
    }

    pub fn with_smalltalk_replies(mut self, replies: SmalltalkReplies) -> Self {
        self.replies = replies;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Decide how a question will be handled without calling any collaborator.
    pub fn route(&self, question: &str, history: &[Turn]) -> Route {
        if has_khmer_script(question) {
            return Route::KhmerRedirect;
        }

        let analysis = self.classifier.analyze(question, history);
        if analysis.intent == Intent::Smalltalk {
            return Route::Smalltalk { analysis };
        }

        let query = self.followup.rewrite(question, history);
        Route::Retrieve { analysis, query }
    }

    /// Answer with the configured top-k.
    pub async fn answer_question_default(
        &self,
        question: &str,
        history: &[Turn],
    ) -> Result<AssistantReply> {
        self.answer_question(question, history, self.settings.top_k).await
    }

    /// Produce the answer text and the top context snippet for one question.
    ///
    /// Every input yields a reply; errors come only from the retriever or generator.
    pub async fn answer_question(
        &self,
        question: &str,
        history: &[Turn],
        k: usize,
    ) -> Result<AssistantReply> {
        match self.route(question, history) {
            Route::KhmerRedirect => {
                tracing::info!("Khmer script detected, asking agent to retype in English");
                Ok(AssistantReply::new(KHMER_REDIRECT_MESSAGE, KHMER_SNIPPET))
            }
            Route::Smalltalk { analysis } => {
                tracing::debug!(rule = ?analysis.rule, "Smalltalk, skipping retrieval");
                Ok(AssistantReply::new(self.replies.pick(), SMALLTALK_SNIPPET))
            }
            Route::Retrieve { analysis, query } => {
                tracing::debug!(
                    rule = ?analysis.rule,
                    bank_score = analysis.signals.bank_score,
                    problem_score = analysis.signals.problem_score,
                    "Banking intent"
                );
                self.retrieve_and_answer(question, &query, history, k).await
            }
        }
    }

    async fn retrieve_and_answer(
        &self,
        question: &str,
        query: &RetrievalQuery,
        history: &[Turn],
        k: usize,
    ) -> Result<AssistantReply> {
        if let Some(reason) = &query.followup {
            tracing::debug!(?reason, "Follow-up detected, merging with previous question");
        }

        let retrieval = self.retriever.retrieve(&query.query, k).await?;
        tracing::debug!(
            "Retrieved {} documents (min distance {:?})",
            retrieval.documents.len(),
            retrieval.min_distance
        );

        let snippet = top_snippet(&retrieval);

        match RetrievalDecision::from_retrieval(&retrieval, self.settings.low_confidence_threshold) {
            RetrievalDecision::LowConfidenceFallback => {
                tracing::info!(
                    "Low retrieval confidence (min distance {:?}, threshold {}), returning fallback",
                    retrieval.min_distance,
                    self.settings.low_confidence_threshold
                );
                Ok(AssistantReply::new(LOW_CONFIDENCE_ANSWER, snippet))
            }
            RetrievalDecision::LlmSynthesis => {
                let history_text = build_history_prefix(history, self.settings.max_history_turns);
                let prompt = build_prompt(question, &retrieval.documents, &history_text);

                let text = self
                    .generator
                    .complete(
                        &prompt.system_instruction,
                        &prompt.user_prompt,
                        self.settings.temperature,
                    )
                    .await?;

                let answer = if text.is_empty() {
                    tracing::warn!("Generator returned no text");
                    GENERATION_FAILED_MESSAGE.to_string()
                } else {
                    text
                };
                Ok(AssistantReply::new(answer, snippet))
            }
        }
    }
}

fn top_snippet(retrieval: &Retrieval) -> String {
    retrieval
        .top()
        .map(|d| d.text.clone())
        .unwrap_or_else(|| NO_CONTEXT_SNIPPET.to_string())
}
