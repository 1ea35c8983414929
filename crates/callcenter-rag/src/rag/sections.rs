//! Best-effort extraction of the three labelled answer sections.
//!
//! Generated answers are free text that usually, but not always, follow the
//! "Customer answer / Internal notes / Steps" layout. Parsing never fails: a
//! missing label yields `None` for that section.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STEPS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*steps?:").expect("steps label regex is valid"));
static STEP_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^\s*[-*•]\s+|(?:^|\s+)\d+[.)]\s+)").expect("step marker regex is valid")
});

const CUSTOMER_LABEL: &str = "customer answer:";
const NOTES_LABEL: &str = "internal notes:";
const STEPS_LABEL: &str = "steps:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSections {
    /// The whole answer when no "Customer answer:" label is present.
    pub customer_answer: String,
    pub internal_notes: Option<String>,
    pub steps: Option<String>,
    /// False when the answer did not carry the expected labels.
    pub structured: bool,
}

impl AnswerSections {
    pub fn parse(answer: &str) -> Self {
        // ASCII lowering keeps byte offsets aligned with `answer`
        let lower = answer.to_ascii_lowercase();
        let customer = lower.find(CUSTOMER_LABEL);
        let notes = lower.find(NOTES_LABEL);
        let steps = lower.find(STEPS_LABEL);

        let Some(customer) = customer else {
            return Self {
                customer_answer: answer.to_string(),
                internal_notes: None,
                steps: None,
                structured: false,
            };
        };

        let customer_end = notes.or(steps);
        Self {
            customer_answer: slice_section(answer, customer, customer_end),
            internal_notes: notes.map(|start| slice_section(answer, start, steps)),
            steps: steps.map(|start| slice_section(answer, start, None)),
            structured: true,
        }
    }

    /// Individual steps, split on numbered or bulleted markers.
    pub fn step_items(&self) -> Vec<String> {
        self.steps.as_deref().map(split_steps).unwrap_or_default()
    }
}

/// Text between `start` and `end`, with everything up to the first colon removed.
fn slice_section(answer: &str, start: usize, end: Option<usize>) -> String {
    let part = match end {
        Some(end) => answer.get(start..end).unwrap_or(""),
        None => answer.get(start..).unwrap_or(""),
    };
    let part = match part.find(':') {
        Some(colon) => &part[colon + 1..],
        None => part,
    };
    part.trim().to_string()
}

/// Split a steps section into items. Returns a single item when no markers are found.
pub fn split_steps(steps: &str) -> Vec<String> {
    let cleaned = STEPS_LABEL_RE.replace(steps, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Vec::new();
    }

    let items: Vec<String> = STEP_MARKER_RE
        .split(cleaned)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if items.len() <= 1 {
        vec![cleaned.to_string()]
    } else {
        items
    }
}
