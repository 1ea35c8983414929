//! Intent Classifier
//!
//! Rule-based smalltalk-vs-banking routing. No model calls: the decision is a
//! pure function of the message text and the vocabulary.
//!
//! Rules are ordered so that a real customer problem is never dropped: any
//! banking or problem keyword wins over everything else, and anything the
//! rules cannot place is treated as a banking inquiry.

use serde::{Deserialize, Serialize};

use super::lexical::{contains_any, normalize, strip_trailing_punctuation, LexicalSignals, Vocabulary};
use crate::types::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Conversational filler; answered with a canned reply, no retrieval.
    Smalltalk,
    /// A real inquiry; goes through retrieval.
    Banking,
}

/// Which rule produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentRule {
    EmptyText,
    CaseKeywords,
    ChitchatQuestion,
    Question,
    MetaIntent,
    ShortGreeting,
    TooShort,
    /// Nothing matched. Kept distinct so logs can tell "unclear" from "clearly banking".
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent: Intent,
    pub rule: IntentRule,
    pub signals: LexicalSignals,
}

const MAX_SMALLTALK_WORDS: usize = 12;
const MAX_GREETING_WORDS: usize = 6;
const MAX_CONTENTLESS_WORDS: usize = 4;

pub struct IntentClassifier {
    vocabulary: Vocabulary,
}

impl IntentClassifier {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// `history` is part of the contract but does not influence the decision.
    pub fn classify(&self, text: &str, history: &[Turn]) -> Intent {
        self.analyze(text, history).intent
    }

    pub fn analyze(&self, text: &str, _history: &[Turn]) -> IntentAnalysis {
        let normalized = normalize(text);
        let stripped = strip_trailing_punctuation(&normalized);
        let signals = LexicalSignals::extract(text, &self.vocabulary);

        let (intent, rule) = if normalized.is_empty() {
            (Intent::Smalltalk, IntentRule::EmptyText)
        } else {
            self.decide(stripped, &signals)
        };
        IntentAnalysis {
            intent,
            rule,
            signals,
        }
    }

    fn decide(&self, stripped: &str, signals: &LexicalSignals) -> (Intent, IntentRule) {
        // Strong evidence of a real case, with or without a question mark
        if signals.has_case_evidence() {
            return (Intent::Banking, IntentRule::CaseKeywords);
        }

        if signals.looks_like_question() {
            if self.is_chitchat_question(stripped) {
                return (Intent::Smalltalk, IntentRule::ChitchatQuestion);
            }
            return (Intent::Banking, IntentRule::Question);
        }

        if signals.smalltalk_score > 0 && signals.word_count <= MAX_SMALLTALK_WORDS {
            if self.is_meta_intent(stripped) {
                return (Intent::Smalltalk, IntentRule::MetaIntent);
            }
            if signals.word_count <= MAX_GREETING_WORDS {
                return (Intent::Smalltalk, IntentRule::ShortGreeting);
            }
        }

        if signals.word_count <= MAX_CONTENTLESS_WORDS && signals.bank_score == 0 {
            return (Intent::Smalltalk, IntentRule::TooShort);
        }

        (Intent::Banking, IntentRule::Default)
    }

    fn is_chitchat_question(&self, text: &str) -> bool {
        contains_any(text, &self.vocabulary.chitchat_questions)
    }

    /// "I have a question", "can I ask ..." - announces a question without asking it.
    fn is_meta_intent(&self, text: &str) -> bool {
        (text.contains("question") && text.contains("have"))
            || contains_any(text, &self.vocabulary.meta_intent_phrases)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}
