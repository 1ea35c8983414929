//! Retrieval gate - routing before retrieval and the confidence check after it.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use super::followup::RetrievalQuery;
use super::intent::IntentAnalysis;
use crate::types::Retrieval;

pub const KHMER_REDIRECT_MESSAGE: &str = "I detected Khmer text. Right now I can only search the internal knowledge base with English questions.\n\
Please retype the customer's question in English (product name, action, amount, etc.).";
pub const KHMER_SNIPPET: &str = "Khmer detected — RAG not used.";

pub const SMALLTALK_SNIPPET: &str = "Smalltalk / intent — no context used.";
pub const DEFAULT_SMALLTALK_REPLIES: [&str; 4] = [
    "Sure. What case are you working on?",
    "No problem. Tell me the customer's question when you're ready.",
    "Happy to help. What does the customer need?",
    "Got it. Please type the customer's question.",
];

pub const LOW_CONFIDENCE_ANSWER: &str = "Customer answer: I'm not fully sure based on the available information. \
Please inform the customer that you will double-check and get back to them.\n\n\
Internal notes: Retrieval confidence was low or there is no closely related article in the current knowledge base.\n\n\
Steps:\n\
1) Confirm the customer's product and key details.\n\
2) Check the official product policy or internal system manually.\n\
3) If still unclear, escalate to a supervisor. (Human handoff recommended.)";
pub const NO_CONTEXT_SNIPPET: &str = "No context retrieved.";

pub const GENERATION_FAILED_MESSAGE: &str = "Sorry, I could not generate an answer.";

/// Where a question goes before any collaborator is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    KhmerRedirect,
    Smalltalk { analysis: IntentAnalysis },
    Retrieve {
        analysis: IntentAnalysis,
        query: RetrievalQuery,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalDecision {
    LowConfidenceFallback,
    LlmSynthesis,
}

impl RetrievalDecision {
    /// Synthesis only when documents came back and the closest one is within `threshold`.
    pub fn from_retrieval(retrieval: &Retrieval, threshold: f32) -> Self {
        if retrieval.is_empty() {
            return Self::LowConfidenceFallback;
        }
        match retrieval.min_distance {
            Some(d) if d.is_finite() && d <= threshold => Self::LlmSynthesis,
            _ => Self::LowConfidenceFallback,
        }
    }
}

/// Canned smalltalk replies with an injectable random source.
pub struct SmalltalkReplies {
    replies: Vec<String>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl SmalltalkReplies {
    /// An empty pool falls back to the default replies.
    pub fn new<I, S>(replies: I, rng: Box<dyn RngCore + Send>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        if replies.is_empty() {
            replies = DEFAULT_SMALLTALK_REPLIES.iter().map(|r| r.to_string()).collect();
        }
        Self {
            replies,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_rng(rng: Box<dyn RngCore + Send>) -> Self {
        Self::new(DEFAULT_SMALLTALK_REPLIES, rng)
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    /// Uniformly pick one reply.
    pub fn pick(&self) -> String {
        let mut rng = self.rng.lock();
        self.replies
            .choose(&mut **rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SMALLTALK_REPLIES[0].to_string())
    }
}

impl Default for SmalltalkReplies {
    fn default() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContextDocument, DocumentMetadata};
    use rand::rngs::mock::StepRng;

    fn retrieval(distances: &[f32]) -> Retrieval {
        Retrieval::from_documents(
            distances
                .iter()
                .map(|d| ContextDocument::new("text", DocumentMetadata::new("kb.xlsx"), *d))
                .collect(),
        )
    }

    #[test]
    fn test_empty_retrieval_falls_back() {
        assert_eq!(
            RetrievalDecision::from_retrieval(&Retrieval::empty(), 1.2),
            RetrievalDecision::LowConfidenceFallback
        );
    }

    #[test]
    fn test_distance_above_threshold_falls_back() {
        assert_eq!(
            RetrievalDecision::from_retrieval(&retrieval(&[1.5, 1.7]), 1.2),
            RetrievalDecision::LowConfidenceFallback
        );
    }

    #[test]
    fn test_distance_within_threshold_synthesizes() {
        assert_eq!(
            RetrievalDecision::from_retrieval(&retrieval(&[0.8, 1.4]), 1.2),
            RetrievalDecision::LlmSynthesis
        );
        assert_eq!(
            RetrievalDecision::from_retrieval(&retrieval(&[1.2]), 1.2),
            RetrievalDecision::LlmSynthesis
        );
    }

    #[test]
    fn test_undefined_min_distance_falls_back() {
        let mut r = retrieval(&[0.3]);
        r.min_distance = None;
        assert_eq!(
            RetrievalDecision::from_retrieval(&r, 1.2),
            RetrievalDecision::LowConfidenceFallback
        );
        r.min_distance = Some(f32::NAN);
        assert_eq!(
            RetrievalDecision::from_retrieval(&r, 1.2),
            RetrievalDecision::LowConfidenceFallback
        );
    }

    #[test]
    fn test_fallback_answer_has_three_sections() {
        let sections = crate::rag::AnswerSections::parse(LOW_CONFIDENCE_ANSWER);
        assert!(sections.structured);
        assert!(sections.internal_notes.is_some());
        assert_eq!(sections.step_items().len(), 3);
    }

    #[test]
    fn test_pick_with_fixed_rng() {
        let replies = SmalltalkReplies::with_rng(Box::new(StepRng::new(0, 0)));
        assert_eq!(replies.pick(), DEFAULT_SMALLTALK_REPLIES[0]);
        assert_eq!(replies.pick(), DEFAULT_SMALLTALK_REPLIES[0]);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = SmalltalkReplies::with_rng(Box::new(StdRng::seed_from_u64(7)));
        let b = SmalltalkReplies::with_rng(Box::new(StdRng::seed_from_u64(7)));
        let picks_a: Vec<String> = (0..10).map(|_| a.pick()).collect();
        let picks_b: Vec<String> = (0..10).map(|_| b.pick()).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|p| DEFAULT_SMALLTALK_REPLIES.contains(&p.as_str())));
    }

    #[test]
    fn test_empty_pool_uses_defaults() {
        let replies = SmalltalkReplies::new(Vec::<String>::new(), Box::new(StepRng::new(0, 0)));
        assert_eq!(replies.replies().len(), DEFAULT_SMALLTALK_REPLIES.len());
    }
}
