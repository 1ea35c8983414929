//! Retrieval-augmented assistant for bank call-center agents.

pub mod assistant;
pub mod config;
pub mod llm;
pub mod rag;
pub mod retriever;
pub mod session;
pub mod types;

// Re-export primary types for convenience
pub use assistant::{CallCenterAssistant, PipelineSettings};
pub use config::{AssistantConfig, ConfigError};
pub use llm::{GeminiProvider, Generator};
pub use rag::{AnswerSections, Intent, IntentClassifier, RetrievalDecision, Route};
pub use retriever::Retriever;
pub use session::Conversation;
pub use types::{AssistantReply, ContextDocument, DocumentMetadata, Retrieval, Turn};

// Re-export common types
pub use anyhow::{Error, Result};
pub use uuid::Uuid;
