//! Follow-up detection and retrieval query rewriting.
//!
//! Agents often type fragments like "without signed also valid?" right after a
//! full question. Such fragments carry too few keywords to retrieve anything
//! useful on their own, so they are merged with the previous question.

use serde::{Deserialize, Serialize};

use super::lexical::{normalize, strip_trailing_punctuation};
use crate::types::Turn;

const MAX_FRAGMENT_WORDS: usize = 6;

const DEFAULT_MARKERS: [&str; 11] = [
    "what about",
    "how about",
    "and for",
    "and then",
    "also",
    "too",
    "again",
    "valid",
    "without",
    "are you sure",
    "really",
];

/// Why a message was judged a continuation of the previous turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowupReason {
    ShortFragment { words: usize },
    ContinuationMarker { marker: String },
    SharedTerms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalQuery {
    pub original_query: String,
    /// The text actually sent to the retriever.
    pub query: String,
    pub followup: Option<FollowupReason>,
}

impl RetrievalQuery {
    pub fn is_followup(&self) -> bool {
        self.followup.is_some()
    }
}

pub struct FollowupDetector {
    markers: Vec<String>,
}

impl FollowupDetector {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(|m| m.into().to_lowercase()).collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn is_followup(&self, question: &str, history: &[Turn]) -> bool {
        self.detect(question, history).is_some()
    }

    /// Returns the first rule that marks `question` as a continuation of the last turn.
    pub fn detect(&self, question: &str, history: &[Turn]) -> Option<FollowupReason> {
        let last = history.last()?;

        let normalized = normalize(question);
        let q = strip_trailing_punctuation(&normalized);
        let words: Vec<&str> = q.split_whitespace().collect();

        if words.len() <= MAX_FRAGMENT_WORDS {
            return Some(FollowupReason::ShortFragment { words: words.len() });
        }

        if let Some(marker) = self.markers.iter().find(|m| q.contains(m.as_str())) {
            return Some(FollowupReason::ContinuationMarker {
                marker: marker.clone(),
            });
        }

        let previous = last.question.to_lowercase();
        if previous.split_whitespace().any(|w| words.contains(&w)) {
            return Some(FollowupReason::SharedTerms);
        }

        None
    }

    /// Build the retrieval query, prefixing the previous question for follow-ups.
    pub fn rewrite(&self, question: &str, history: &[Turn]) -> RetrievalQuery {
        let followup = self.detect(question, history);
        let query = match (&followup, history.last()) {
            (Some(_), Some(last)) => merge_with_previous(&last.question, question),
            _ => question.to_string(),
        };

        RetrievalQuery {
            original_query: question.to_string(),
            query,
            followup,
        }
    }
}

impl Default for FollowupDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS)
    }
}

pub fn merge_with_previous(previous_question: &str, question: &str) -> String {
    format!("{}\nFollow-up: {}", previous_question, question)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(question: &str) -> Vec<Turn> {
        vec![Turn::new(question, "...")]
    }

    #[test]
    fn test_empty_history_is_never_followup() {
        let detector = FollowupDetector::default();
        assert!(!detector.is_followup("also?", &[]));
        assert!(!detector.is_followup("", &[]));
    }

    #[test]
    fn test_marker_also() {
        let detector = FollowupDetector::default();
        let h = history("what is the fee for withdrawal?");
        assert!(detector.is_followup("also for savings?", &h));
    }

    #[test]
    fn test_short_fragment() {
        let detector = FollowupDetector::default();
        let h = history("what documents are needed to open an account?");
        assert_eq!(
            detector.detect("without signed also valid?", &h),
            Some(FollowupReason::ShortFragment { words: 4 })
        );
    }

    #[test]
    fn test_long_message_with_marker() {
        let detector = FollowupDetector::default();
        let h = history("what is the fee for withdrawal?");
        let reason = detector.detect("are you sure that the customer needs to pay that fee today", &h);
        assert_eq!(
            reason,
            Some(FollowupReason::ContinuationMarker {
                marker: "are you sure".to_string()
            })
        );
    }

    #[test]
    fn test_long_message_with_shared_terms() {
        let detector = FollowupDetector::default();
        let h = history("How do I reset a mobile banking password");
        let reason = detector.detect("customer forgot the mobile number linked to the profile", &h);
        assert_eq!(reason, Some(FollowupReason::SharedTerms));
    }

    #[test]
    fn test_unrelated_long_message() {
        let detector = FollowupDetector::default();
        let h = history("fee?");
        assert_eq!(
            detector.detect("customer wants a new debit card delivered to his office", &h),
            None
        );
    }

    #[test]
    fn test_rewrite_merges_previous_question() {
        let detector = FollowupDetector::default();
        let h = history("what is the minimum balance for savings?");
        let rewritten = detector.rewrite("what about for fixed deposit?", &h);
        assert!(rewritten.is_followup());
        assert_eq!(
            rewritten.query,
            "what is the minimum balance for savings?\nFollow-up: what about for fixed deposit?"
        );
        assert_eq!(rewritten.original_query, "what about for fixed deposit?");
    }

    #[test]
    fn test_rewrite_keeps_original_without_history() {
        let detector = FollowupDetector::default();
        let rewritten = detector.rewrite("I cannot login to the mobile app", &[]);
        assert!(!rewritten.is_followup());
        assert_eq!(rewritten.query, "I cannot login to the mobile app");
    }

    #[test]
    fn test_custom_markers_are_lowercased() {
        let detector = FollowupDetector::new(["Same For"]);
        assert_eq!(detector.markers(), ["same for".to_string()]);
        let h = history("what is the fee for a domestic transfer?");
        assert_eq!(
            detector.detect("is it the same for an international transfer today please", &h),
            Some(FollowupReason::ContinuationMarker {
                marker: "same for".to_string()
            })
        );
    }

    #[test]
    fn test_only_last_turn_is_compared() {
        let detector = FollowupDetector::default();
        let h = vec![
            Turn::new("customer wants a new debit card", "..."),
            Turn::new("fee?", "..."),
        ];
        let rewritten = detector.rewrite("customer wants a new debit card delivered to his office", &h);
        assert!(!rewritten.is_followup());
    }
}
