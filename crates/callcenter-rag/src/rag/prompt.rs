//! Prompt construction for answer synthesis.
//!
//! Output is fully deterministic for a given question, document list and history.

use serde::{Deserialize, Serialize};

use crate::types::{ContextDocument, Turn};

pub const SYSTEM_INSTRUCTION: &str = "You are an internal assistant helping call-center agents at a bank.\n\
You must follow these rules:\n\
1) Use ONLY the provided context documents and short conversation history. Do not invent policies.\n\
2) If the context does not contain enough information, say you are not sure and suggest escalating or checking the official system.\n\
3) Always respond in this structure:\n   \
Customer answer: <short, simple explanation the agent will say to the customer in English>.\n   \
Internal notes: <detailed internal explanation referring to context, numbers, and conditions>.\n   \
Steps: <1-3 bullet points on what the agent should do>.\n\
4) Keep tone polite, clear, and professional. Do not mention embeddings, vectors, or retrieval.\n";

pub const NO_CONTEXT_MARKER: &str = "No context found.";

const DOC_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system_instruction: String,
    pub user_prompt: String,
}

/// Render the last `max_turns` turns as `Agent:` / `Assistant:` lines.
pub fn build_history_prefix(history: &[Turn], max_turns: usize) -> String {
    let start = history.len().saturating_sub(max_turns);
    history[start..]
        .iter()
        .flat_map(|turn| {
            [
                format!("Agent: {}", turn.question),
                format!("Assistant: {}", turn.answer),
            ]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_document(index: usize, doc: &ContextDocument) -> String {
    let mut source = if doc.metadata.source.is_empty() {
        "unknown source".to_string()
    } else {
        doc.metadata.source.clone()
    };
    if let Some(page) = doc.metadata.page.filter(|p| *p > 0) {
        source.push_str(&format!(" (page {})", page));
    }
    format!(
        "[Doc {} | {} | dist={:.2}]\n{}",
        index + 1,
        source,
        doc.distance,
        doc.text
    )
}

/// Numbered context documents, or the no-context marker when there are none.
pub fn format_context_block(documents: &[ContextDocument]) -> String {
    if documents.is_empty() {
        return NO_CONTEXT_MARKER.to_string();
    }
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format_document(i, doc))
        .collect::<Vec<_>>()
        .join(DOC_SEPARATOR)
}

pub fn build_prompt(question: &str, documents: &[ContextDocument], history_text: &str) -> Prompt {
    let user_prompt = format!(
        "{}\n\nKnowledge base context:\n{}\n\nAgent's question: {}\n\nNow produce the structured answer.",
        history_text,
        format_context_block(documents),
        question
    );

    Prompt {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        user_prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn docs() -> Vec<ContextDocument> {
        vec![
            ContextDocument::new(
                "Minimum balance for savings is $10.",
                DocumentMetadata::new("savings.xlsx"),
                0.4321,
            ),
            ContextDocument::new(
                "Fixed deposits require a 3 month term.",
                DocumentMetadata::new("6. Terms and Conditions.pdf").with_page(2),
                0.9,
            ),
        ]
    }

    #[test]
    fn test_system_instruction_rules() {
        assert!(SYSTEM_INSTRUCTION.contains("1) Use ONLY the provided context"));
        assert!(SYSTEM_INSTRUCTION.contains("Customer answer:"));
        assert!(SYSTEM_INSTRUCTION.contains("Internal notes:"));
        assert!(SYSTEM_INSTRUCTION.contains("Steps: <1-3 bullet points"));
        assert!(SYSTEM_INSTRUCTION.contains("4) Keep tone polite"));
    }

    #[test]
    fn test_context_block_format() {
        let block = format_context_block(&docs());
        assert_eq!(
            block,
            "[Doc 1 | savings.xlsx | dist=0.43]\nMinimum balance for savings is $10.\
             \n\n---\n\n\
             [Doc 2 | 6. Terms and Conditions.pdf (page 2) | dist=0.90]\nFixed deposits require a 3 month term."
        );
    }

    #[test]
    fn test_missing_source_is_labelled() {
        let doc = ContextDocument::new("text", DocumentMetadata::default(), 0.1);
        assert!(format_context_block(&[doc]).starts_with("[Doc 1 | unknown source | dist=0.10]"));
    }

    #[test]
    fn test_empty_documents_use_marker() {
        let prompt = build_prompt("what is the fee?", &[], "");
        assert!(prompt.user_prompt.contains("Knowledge base context:\nNo context found."));
    }

    #[test]
    fn test_user_prompt_order() {
        let history = build_history_prefix(&[Turn::new("hi", "Happy to help.")], 6);
        let prompt = build_prompt("what is the minimum balance?", &docs(), &history);
        let p = &prompt.user_prompt;

        let h = p.find("Agent: hi").unwrap();
        let c = p.find("Knowledge base context:").unwrap();
        let q = p.find("Agent's question: what is the minimum balance?").unwrap();
        let i = p.find("Now produce the structured answer.").unwrap();
        assert!(h < c && c < q && q < i);
        assert!(p.ends_with("Now produce the structured answer."));
    }

    #[test]
    fn test_history_prefix_keeps_last_turns() {
        let history: Vec<Turn> = (0..8)
            .map(|i| Turn::new(format!("q{i}"), format!("a{i}")))
            .collect();
        let prefix = build_history_prefix(&history, 6);
        assert!(!prefix.contains("q1"));
        assert!(prefix.starts_with("Agent: q2\nAssistant: a2"));
        assert!(prefix.ends_with("Agent: q7\nAssistant: a7"));
        assert_eq!(prefix.lines().count(), 12);
    }

    #[test]
    fn test_history_prefix_empty() {
        assert_eq!(build_history_prefix(&[], 6), "");
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("q", &docs(), "h");
        let b = build_prompt("q", &docs(), "h");
        assert_eq!(a, b);
    }
}
