//! Data passed between the pipeline, the retriever and the host.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One completed exchange: what the agent typed and what the assistant replied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Provenance of a retrieved passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Loader-specific fields (row index, category, subcategory, ...).
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl DocumentMetadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page: None,
            extra: HashMap::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
    /// Embedding distance to the query; lower is closer.
    pub distance: f32,
}

impl ContextDocument {
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata, distance: f32) -> Self {
        Self {
            text: text.into(),
            metadata,
            distance,
        }
    }
}

/// Documents returned by a retriever, ordered by ascending distance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    pub documents: Vec<ContextDocument>,
    /// `None` exactly when `documents` is empty.
    pub min_distance: Option<f32>,
}

impl Retrieval {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from ranked documents, deriving the minimum distance.
    pub fn from_documents(documents: Vec<ContextDocument>) -> Self {
        let min_distance = documents
            .iter()
            .map(|d| d.distance)
            .fold(None, |acc: Option<f32>, d| match acc {
                Some(m) if m <= d => Some(m),
                _ => Some(d),
            });
        Self {
            documents,
            min_distance,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The highest-ranked document, if any.
    pub fn top(&self) -> Option<&ContextDocument> {
        self.documents.first()
    }
}

/// Output of one turn: the answer shown to the agent and the top context passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub answer: String,
    pub context_snippet: String,
}

impl AssistantReply {
    pub fn new(answer: impl Into<String>, context_snippet: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            context_snippet: context_snippet.into(),
        }
    }
}
