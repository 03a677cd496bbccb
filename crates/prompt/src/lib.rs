//! Prompt templates for grounded answers.
//!
//! Definitions are YAML files rendered with Handlebars. The built-in
//! definition ships inside the binary; a prompts directory can override it
//! by id.

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{load_prompt, GROUNDED_ANSWER_PROMPT};
pub use types::{BuiltPrompt, ContextEntry, PromptDefinition, PromptInput};
