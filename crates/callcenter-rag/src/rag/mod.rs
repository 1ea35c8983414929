//! RAG pipeline pieces - lexical signals, intent routing, follow-up rewriting,
//! the retrieval gate, prompt construction and answer section parsing.

pub mod followup;
pub mod gate;
pub mod intent;
pub mod lexical;
pub mod prompt;
pub mod sections;

// Re-export commonly used types
pub use followup::{merge_with_previous, FollowupDetector, FollowupReason, RetrievalQuery};
pub use gate::{RetrievalDecision, Route, SmalltalkReplies};
pub use intent::{Intent, IntentAnalysis, IntentClassifier, IntentRule};
pub use lexical::{has_khmer_script, LexicalSignals, Vocabulary};
pub use prompt::{build_history_prefix, build_prompt, format_context_block, Prompt, SYSTEM_INSTRUCTION};
pub use sections::{split_steps, AnswerSections};
