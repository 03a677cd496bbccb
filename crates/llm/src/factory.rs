//! Backend selection from configuration.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_URL};
use legalqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create the generation client for `provider`.
///
/// `endpoint` replaces the provider's default base URL. `timeout` bounds
/// each HTTP request. An unknown provider, or `openai` without a key, is a
/// configuration error.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match provider.to_ascii_lowercase().as_str() {
        "ollama" => Arc::new(OllamaClient::new(
            endpoint.unwrap_or(DEFAULT_OLLAMA_URL),
            timeout,
        )?),
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI generation requires an API key".to_string())
            })?;
            Arc::new(OpenAiClient::new(
                endpoint.unwrap_or(DEFAULT_OPENAI_URL),
                api_key,
                timeout,
            )?)
        }
        other => {
            return Err(AppError::Config(format!(
                "Unknown generation provider: '{}'",
                other
            )))
        }
    };

    tracing::debug!("Created {} generation client", client.provider_name());
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_known_providers() {
        let ollama = create_client("ollama", Some("http://localhost:8080"), None, TIMEOUT).unwrap();
        assert_eq!(ollama.provider_name(), "ollama");

        let openai = create_client("OpenAI", None, Some("sk-test"), TIMEOUT).unwrap();
        assert_eq!(openai.provider_name(), "openai");
    }

    #[test]
    fn test_openai_without_key() {
        assert!(matches!(
            create_client("openai", None, None, TIMEOUT),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("anthropic", None, None, TIMEOUT) {
            Err(AppError::Config(msg)) => assert!(msg.contains("anthropic")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected an error for an unknown provider"),
        }
    }
}
