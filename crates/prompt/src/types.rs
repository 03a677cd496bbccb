//! Prompt types for LegalQA.
//!
//! This module defines the prompt definition loaded from YAML and the
//! values rendered into it.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML.
///
/// `system` and `template` are Handlebars templates rendered against a
/// [`PromptInput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,
    pub title: String,

    /// Schema version, `major.minor`
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(default)]
    pub system: Option<String>,

    pub template: String,
}

/// One knowledge entry as it appears in the context segment.
#[derive(Debug, Clone, Serialize)]
pub struct ContextEntry {
    /// 1-based rank of the entry
    pub position: usize,
    pub question: String,
    pub answer: String,
    pub category: String,
    /// Similarity score formatted with two decimals
    pub relevance: String,
}

impl ContextEntry {
    pub fn new(
        position: usize,
        question: impl Into<String>,
        answer: impl Into<String>,
        category: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            position,
            question: question.into(),
            answer: answer.into(),
            category: category.into(),
            relevance: format!("{:.2}", score),
        }
    }
}

/// Variables available to the templates.
#[derive(Debug, Clone, Serialize)]
pub struct PromptInput {
    /// The user's question
    pub query: String,

    /// Retrieved entries, best first
    pub matches: Vec<ContextEntry>,
}

/// Rendered prompt text, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltPrompt {
    /// Id of the definition it was rendered from
    pub prompt_id: String,
    pub system: Option<String>,
    pub user: String,

    /// Number of knowledge entries in the context segment
    pub context_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: test.prompt
title: Test Prompt
apiVersion: "1.0"
system: "You answer legal questions."
template: "{{query}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "test.prompt");
        assert_eq!(def.system.as_deref(), Some("You answer legal questions."));
    }

    #[test]
    fn test_definition_without_system() {
        let yaml = r#"
id: bare
title: Bare
apiVersion: "1.0"
template: "{{query}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert!(def.system.is_none());
    }

    #[test]
    fn test_context_entry_formats_relevance() {
        let entry = ContextEntry::new(1, "q", "a", "Personal Injury", 0.9512);
        assert_eq!(entry.relevance, "0.95");
        assert_eq!(entry.position, 1);
    }
}
