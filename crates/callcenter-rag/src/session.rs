//! Conversation history owned by the host, one per agent session.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assistant::CallCenterAssistant;
use crate::llm::Generator;
use crate::retriever::Retriever;
use crate::types::{AssistantReply, Turn};

/// One agent's conversation with the assistant.
///
/// Owns the turn history that the pipeline only reads. A turn is appended
/// after each successful answer, including canned replies. Failed turns leave
/// the history untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: Uuid,
    started_at: DateTime<Utc>,
    turns: Vec<Turn>,
    asked_at: Vec<DateTime<Utc>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            turns: Vec::new(),
            asked_at: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Timestamp of the `index`-th turn.
    pub fn asked_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.asked_at.get(index).copied()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.asked_at.push(Utc::now());
    }

    pub async fn ask<R, G>(
        &mut self,
        assistant: &CallCenterAssistant<R, G>,
        question: &str,
    ) -> Result<AssistantReply>
    where
        R: Retriever,
        G: Generator,
    {
        let reply = assistant.answer_question_default(question, &self.turns).await?;
        self.push(Turn::new(question, reply.answer.clone()));
        tracing::debug!(conversation = %self.id, turns = self.turns.len(), "Turn recorded");
        Ok(reply)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
