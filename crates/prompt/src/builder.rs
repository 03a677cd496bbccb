//! Prompt builder for rendering templates with retrieved context.

use crate::types::{BuiltPrompt, PromptDefinition, PromptInput};
use handlebars::Handlebars;
use legalqa_core::{AppError, AppResult};
use serde::Serialize;

/// Build a prompt from a definition and the request's input.
///
/// Renders the system template (if any) and the user template with the
/// query and the ranked context entries.
///
/// # Example
/// ```no_run
/// use legalqa_prompt::{build_prompt, load_prompt, ContextEntry, PromptInput};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(None, "legal.answer.grounded")?;
/// let input = PromptInput {
///     query: "How long do I have to sue?".to_string(),
///     matches: vec![ContextEntry::new(1, "Statute of limitations?", "Two years.", "Personal Injury", 0.95)],
/// };
///
/// let built = build_prompt(&def, &input)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(definition: &PromptDefinition, input: &PromptInput) -> AppResult<BuiltPrompt> {
    tracing::debug!(
        "Building prompt {} with {} context entries",
        definition.id,
        input.matches.len()
    );

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, input))
        .transpose()?;

    let user = render_template(&definition.template, input)?;

    Ok(BuiltPrompt {
        prompt_id: definition.id.clone(),
        system,
        user,
        context_entries: input.matches.len(),
    })
}

/// Render a Handlebars template against serializable data.
fn render_template<T: Serialize>(template: &str, data: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
