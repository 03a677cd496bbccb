//! Prompt loader for YAML prompt definitions.
//!
//! Built-in definitions are compiled into the binary. A prompts directory,
//! when configured, may shadow any of them with a `<id>.yml` file.

use crate::types::PromptDefinition;
use legalqa_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the grounded answer prompt.
pub const GROUNDED_ANSWER_PROMPT: &str = "legal.answer.grounded";

const BUILTIN_PROMPTS: &[(&str, &str)] = &[(
    GROUNDED_ANSWER_PROMPT,
    include_str!("../prompts/legal.answer.grounded.yml"),
)];

/// Load a prompt definition by ID.
///
/// # Arguments
/// * `prompts_dir` - Optional override directory searched first
/// * `prompt_id` - Prompt identifier (e.g., "legal.answer.grounded")
///
/// # Example
/// ```no_run
/// use legalqa_prompt::{load_prompt, GROUNDED_ANSWER_PROMPT};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(None, GROUNDED_ANSWER_PROMPT)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    if let Some(dir) = prompts_dir {
        let prompt_file = dir.join(format!("{}.yml", prompt_id));
        if prompt_file.exists() {
            tracing::debug!("Loading prompt from: {:?}", prompt_file);

            let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to read prompt file {:?}: {}",
                    prompt_file, e
                ))
            })?;

            let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;
            tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
            return Ok(definition);
        }
    }

    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
