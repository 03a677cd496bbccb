//! Configuration management for the LegalQA service.
//!
//! Configuration is resolved once at process start, in increasing precedence:
//! - Built-in defaults
//! - A YAML config file (`LEGALQA_CONFIG`, or `legalqa.yaml` in the working directory)
//! - Environment variables (`LEGALQA_*`, plus `OPENAI_API_KEY`)
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is validated with [`AppConfig::validate`] and then
//! shared read-only (behind an `Arc`) with every component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers that can produce embeddings.
pub const EMBEDDING_PROVIDERS: [&str; 3] = ["openai", "ollama", "trigram"];

/// Providers that can generate answers. `none` disables generation entirely,
/// so every grounded answer takes the fallback path.
pub const GENERATION_PROVIDERS: [&str; 3] = ["openai", "ollama", "none"];

/// Supported vector index backends.
pub const INDEX_BACKENDS: [&str; 2] = ["qdrant", "memory"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Emit JSON log lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// API key for OpenAI-compatible providers
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Per-call timeout for embedding, index and generation requests
    pub request_timeout_secs: u64,

    pub server: ServerConfig,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
    pub vector_index: VectorIndexSettings,
    pub storage: StorageSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind (e.g. "0.0.0.0:8000")
    pub bind: String,

    /// Origins allowed by CORS
    #[serde(rename = "corsOrigins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

/// Embedding adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name: "openai", "ollama", "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimension, must match the index collection
    pub dimension: usize,

    /// Custom endpoint URL
    pub endpoint: Option<String>,

    /// Maximum texts per batch request at index-build time
    #[serde(rename = "batchSize")]
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            endpoint: None,
            batch_size: 100,
        }
    }
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Provider name: "openai", "ollama", "none"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,

    /// Maximum output tokens
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,

    /// Custom endpoint URL
    pub endpoint: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4-turbo-preview".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            endpoint: None,
        }
    }
}

/// Retrieval tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Maximum number of matches returned
    #[serde(rename = "topK")]
    pub top_k: usize,

    /// Minimum similarity score a match must reach
    #[serde(rename = "similarityThreshold")]
    pub similarity_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 2,
            similarity_threshold: 0.7,
        }
    }
}

/// Vector index collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexSettings {
    /// Backend: "qdrant" or "memory"
    pub backend: String,

    pub host: String,

    pub port: u16,

    /// Collection holding the FAQ points
    pub collection: String,
}

impl Default for VectorIndexSettings {
    fn default() -> Self {
        Self {
            backend: "qdrant".to_string(),
            host: "localhost".to_string(),
            port: 6334,
            collection: "legal_faqs".to_string(),
        }
    }
}

impl VectorIndexSettings {
    /// URL of the index gRPC endpoint.
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Persistent state locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite interaction log
    #[serde(rename = "databasePath")]
    pub database_path: PathBuf,

    /// Static FAQ dataset (file or directory of JSON files)
    #[serde(rename = "datasetPath")]
    pub dataset_path: PathBuf,

    /// Optional directory of prompt definition overrides
    #[serde(rename = "promptsDir")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/interactions.db"),
            dataset_path: PathBuf::from("data/legal_faqs.json"),
            prompts_dir: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    server: Option<ServerConfig>,
    embedding: Option<EmbeddingSettings>,
    generation: Option<GenerationSettings>,
    retrieval: Option<RetrievalSettings>,
    #[serde(rename = "vectorIndex")]
    vector_index: Option<VectorIndexSettings>,
    storage: Option<StorageSettings>,
    logging: Option<LoggingConfig>,
    #[serde(rename = "requestTimeoutSecs")]
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
            api_key: None,
            request_timeout_secs: 30,
            server: ServerConfig::default(),
            embedding: EmbeddingSettings::default(),
            generation: GenerationSettings::default(),
            retrieval: RetrievalSettings::default(),
            vector_index: VectorIndexSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `LEGALQA_CONFIG`: Path to config file
    /// - `LEGALQA_BIND`: Server bind address
    /// - `LEGALQA_EMBEDDING_PROVIDER`, `LEGALQA_EMBEDDING_MODEL`, `LEGALQA_EMBEDDING_DIMENSION`
    /// - `LEGALQA_LLM_PROVIDER`, `LEGALQA_LLM_MODEL`, `LEGALQA_LLM_TEMPERATURE`, `LEGALQA_MAX_TOKENS`
    /// - `LEGALQA_TOP_K`, `LEGALQA_SIMILARITY_THRESHOLD`
    /// - `LEGALQA_INDEX_BACKEND`, `LEGALQA_INDEX_HOST`, `LEGALQA_INDEX_PORT`, `LEGALQA_INDEX_COLLECTION`
    /// - `LEGALQA_DATABASE_PATH`, `LEGALQA_DATASET_PATH`
    /// - `LEGALQA_REQUEST_TIMEOUT_SECS`
    /// - `LEGALQA_API_KEY` or `OPENAI_API_KEY`: provider API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use legalqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {}", config.vector_index.base_url());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(std::env::var("LEGALQA_CONFIG").ok().map(PathBuf::from))
    }

    /// Like [`AppConfig::load`], with an explicit config file path.
    ///
    /// An explicit path that does not exist is an error; the default
    /// `legalqa.yaml` is optional.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self {
            config_file,
            ..Self::default()
        };

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("legalqa.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(server) = config_file.server {
            result.server = server;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }
        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(vector_index) = config_file.vector_index {
            result.vector_index = vector_index;
        }
        if let Some(storage) = config_file.storage {
            result.storage = storage;
        }
        if let Some(timeout) = config_file.request_timeout_secs {
            result.request_timeout_secs = timeout;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply environment-style overrides using the given lookup.
    ///
    /// Unparseable numeric values are configuration errors rather than being
    /// silently ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("LEGALQA_BIND") {
            self.server.bind = bind;
        }

        if let Some(provider) = lookup("LEGALQA_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Some(model) = lookup("LEGALQA_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dim) = lookup("LEGALQA_EMBEDDING_DIMENSION") {
            self.embedding.dimension = parse_env("LEGALQA_EMBEDDING_DIMENSION", &dim)?;
        }
        if let Some(endpoint) = lookup("LEGALQA_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = Some(endpoint);
        }

        if let Some(provider) = lookup("LEGALQA_LLM_PROVIDER") {
            self.generation.provider = provider;
        }
        if let Some(model) = lookup("LEGALQA_LLM_MODEL") {
            self.generation.model = model;
        }
        if let Some(temperature) = lookup("LEGALQA_LLM_TEMPERATURE") {
            self.generation.temperature = parse_env("LEGALQA_LLM_TEMPERATURE", &temperature)?;
        }
        if let Some(max_tokens) = lookup("LEGALQA_MAX_TOKENS") {
            self.generation.max_tokens = parse_env("LEGALQA_MAX_TOKENS", &max_tokens)?;
        }
        if let Some(endpoint) = lookup("LEGALQA_LLM_ENDPOINT") {
            self.generation.endpoint = Some(endpoint);
        }

        if let Some(top_k) = lookup("LEGALQA_TOP_K") {
            self.retrieval.top_k = parse_env("LEGALQA_TOP_K", &top_k)?;
        }
        if let Some(threshold) = lookup("LEGALQA_SIMILARITY_THRESHOLD") {
            self.retrieval.similarity_threshold =
                parse_env("LEGALQA_SIMILARITY_THRESHOLD", &threshold)?;
        }

        if let Some(backend) = lookup("LEGALQA_INDEX_BACKEND") {
            self.vector_index.backend = backend;
        }
        if let Some(host) = lookup("LEGALQA_INDEX_HOST") {
            self.vector_index.host = host;
        }
        if let Some(port) = lookup("LEGALQA_INDEX_PORT") {
            self.vector_index.port = parse_env("LEGALQA_INDEX_PORT", &port)?;
        }
        if let Some(collection) = lookup("LEGALQA_INDEX_COLLECTION") {
            self.vector_index.collection = collection;
        }

        if let Some(path) = lookup("LEGALQA_DATABASE_PATH") {
            self.storage.database_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("LEGALQA_DATASET_PATH") {
            self.storage.dataset_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("LEGALQA_PROMPTS_DIR") {
            self.storage.prompts_dir = Some(PathBuf::from(dir));
        }

        if let Some(timeout) = lookup("LEGALQA_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("LEGALQA_REQUEST_TIMEOUT_SECS", &timeout)?;
        }

        if let Some(key) = lookup("LEGALQA_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Whether a generative model is configured at all.
    pub fn generation_configured(&self) -> bool {
        match self.generation.provider.as_str() {
            "none" => false,
            "openai" => self.api_key.is_some(),
            _ => true,
        }
    }

    /// Per-call timeout for external requests.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration. Runs once at startup; any error is fatal.
    pub fn validate(&self) -> AppResult<()> {
        check_known("embedding provider", &self.embedding.provider, &EMBEDDING_PROVIDERS)?;
        check_known(
            "generation provider",
            &self.generation.provider,
            &GENERATION_PROVIDERS,
        )?;
        check_known("vector index backend", &self.vector_index.backend, &INDEX_BACKENDS)?;

        if self.embedding.dimension == 0 {
            return Err(AppError::Config(
                "Embedding dimension must be greater than zero".to_string(),
            ));
        }

        if self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.similarity_threshold) {
            return Err(AppError::Config(format!(
                "Similarity threshold must be within [0, 1], got {}",
                self.retrieval.similarity_threshold
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("top-K must be at least 1".to_string()));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be within [0, 2], got {}",
                self.generation.temperature
            )));
        }

        if self.generation.max_tokens == 0 {
            return Err(AppError::Config(
                "Max output tokens must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        let needs_key =
            self.embedding.provider == "openai" || self.generation.provider == "openai";
        if needs_key && self.api_key.is_none() {
            return Err(AppError::Config(
                "OpenAI provider requires an API key (set LEGALQA_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn check_known(what: &str, value: &str, known: &[&str]) -> AppResult<()> {
    if known.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Unknown {}: {}. Supported: {}",
            what,
            value,
            known.join(", ")
        )))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid value for {}: {} ({})", key, value, e)))
}
