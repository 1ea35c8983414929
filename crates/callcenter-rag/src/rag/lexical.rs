//! Lexical signals - keyword scoring and script cues used by intent routing.
//!
//! Everything here is a pure function of the input text and a [`Vocabulary`].

use serde::{Deserialize, Serialize};

/// Question words that mark a message as an inquiry.
pub const WH_WORDS: [&str; 6] = ["what", "how", "when", "where", "why", "which"];

/// Keyword sets the classifier scores text against.
///
/// Entries are lower-case and matched by substring containment. Each distinct
/// entry contributes at most one point to its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Banking products, channels, authentication and fee terms.
    pub banking: Vec<String>,
    /// Negations and failure words that signal a customer problem.
    pub problem: Vec<String>,
    /// Greetings, thanks, acknowledgements, closings.
    pub smalltalk: Vec<String>,
    /// Questions that are chit-chat even though they look like inquiries.
    pub chitchat_questions: Vec<String>,
    /// Preambles announcing a question without asking one.
    pub meta_intent_phrases: Vec<String>,
}

impl Vocabulary {
    pub fn new(
        banking: &[&str],
        problem: &[&str],
        smalltalk: &[&str],
        chitchat_questions: &[&str],
        meta_intent_phrases: &[&str],
    ) -> Self {
        Self {
            banking: distinct(banking),
            problem: distinct(problem),
            smalltalk: distinct(smalltalk),
            chitchat_questions: distinct(chitchat_questions),
            meta_intent_phrases: distinct(meta_intent_phrases),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(
            &[
                // products
                "account", "savings", "current", "checking", "fixed deposit", "time deposit",
                "term deposit", "deposit", "withdrawal", "withdraw", "transfer", "remittance",
                "loan", "credit", "card", "debit", "atm", "cif", "kyc",
                // channels
                "mobile app", "mobile banking", "internet banking", "online banking", "ibanking",
                "i-banking", "app login",
                // authentication / security
                "otp", "one time password", "one-time password", "password", "pin", "passcode",
                "login", "log in", "locked", "block", "blocked", "lock", "unlock",
                "cannot login", "can't login", "failed login", "mobile app login", "login issue",
                "verification", "auth", "authentication",
                // slips and statements
                "statement", "passbook", "slip",
                // fees and limits
                "fees", "charges", "interest", "rate", "limit", "transaction",
                "failed transaction",
            ],
            &[
                "cannot", "can't", "cant", "error", "issue", "problem", "failed", "not working",
                "still cannot", "still can't", "doesn't work", "does not work",
            ],
            &[
                "hi", "hello", "hey", "good morning", "good afternoon", "good evening", "thanks",
                "thank you", "thank", "ok", "okay", "cool", "great", "nice", "bye", "goodbye",
                "see you", "got it", "understood",
            ],
            &["how are you", "how's it going"],
            &["want to ask", "can i ask", "can you answer", "you can answer"],
        )
    }
}

fn distinct(words: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for w in words {
        let w = w.trim().to_lowercase();
        if !w.is_empty() && !out.contains(&w) {
            out.push(w);
        }
    }
    out
}

/// Lower-case and trim.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Drop trailing sentence punctuation (`.`, `!`, `?`).
pub fn strip_trailing_punctuation(text: &str) -> &str {
    text.trim_end_matches(['.', '!', '?'])
}

/// Number of distinct keywords contained in `text`.
pub fn keyword_score(text: &str, keywords: &[String]) -> usize {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|kw| lower.contains(kw.as_str()))
        .count()
}

/// True if any character falls in the Khmer block (U+1780–U+17FF).
pub fn has_khmer_script(text: &str) -> bool {
    text.chars().any(|c| ('\u{1780}'..='\u{17FF}').contains(&c))
}

pub fn has_wh_word(text: &str) -> bool {
    let lower = text.to_lowercase();
    WH_WORDS.iter().any(|w| lower.contains(w))
}

pub fn has_question_mark(text: &str) -> bool {
    text.contains('?')
}

pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| text.contains(p.as_str()))
}

/// Signals extracted from a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalSignals {
    pub bank_score: usize,
    pub problem_score: usize,
    pub smalltalk_score: usize,
    pub word_count: usize,
    pub has_question_mark: bool,
    pub has_wh_word: bool,
}

impl LexicalSignals {
    /// Scores are computed on the normalized text with trailing punctuation removed;
    /// the question-mark cue looks at the original text.
    pub fn extract(text: &str, vocabulary: &Vocabulary) -> Self {
        let normalized = normalize(text);
        let stripped = strip_trailing_punctuation(&normalized);

        Self {
            bank_score: keyword_score(stripped, &vocabulary.banking),
            problem_score: keyword_score(stripped, &vocabulary.problem),
            smalltalk_score: keyword_score(stripped, &vocabulary.smalltalk),
            word_count: stripped.split_whitespace().count(),
            has_question_mark: has_question_mark(text),
            has_wh_word: has_wh_word(stripped),
        }
    }

    pub fn has_case_evidence(&self) -> bool {
        self.bank_score > 0 || self.problem_score > 0
    }

    pub fn looks_like_question(&self) -> bool {
        self.has_question_mark || self.has_wh_word
    }
}
