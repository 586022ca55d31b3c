//! Application configuration for AnswerScout.
//!
//! User config lives at `~/.answerscout/answerscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "answerscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".answerscout";

// ---------------------------------------------------------------------------
// Config structs (matching answerscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exploration defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// OpenAI-compatible oracle settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Optional answer-report sink.
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Seed site root to explore (overridable per run).
    #[serde(default)]
    pub site_root: Option<String>,

    /// Page budget per question.
    #[serde(default = "default_max_pages")]
    pub max_pages_per_question: usize,

    /// Maximum characters per content chunk.
    #[serde(default = "default_chunk_max_chars")]
    pub chunk_max_chars: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            site_root: None,
            max_pages_per_question: default_max_pages(),
            chunk_max_chars: default_chunk_max_chars(),
        }
    }
}

fn default_max_pages() -> usize {
    10
}
fn default_chunk_max_chars() -> usize {
    1000
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model for relevance scoring, validation, and extraction.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model for chunk embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

/// `[report]` section — where the final answer map may be POSTed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report endpoint URL. When unset, answers are only printed.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Name of the env var holding the report API key.
    #[serde(default = "default_report_key_env")]
    pub api_key_env: String,

    /// Task identifier sent alongside the answers.
    #[serde(default)]
    pub task: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_report_key_env(),
            task: None,
        }
    }
}

fn default_report_key_env() -> String {
    "REPORT_API_KEY".into()
}

// ---------------------------------------------------------------------------
// Explore config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime exploration configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    /// Site root used as the seed URL and for resolving relative links.
    pub site_root: Url,
    /// Maximum pages explored per question.
    pub max_pages_per_question: usize,
    /// Maximum characters per content chunk.
    pub chunk_max_chars: usize,
    /// Links scoring at or below this never enter the frontier.
    pub enqueue_floor: f64,
    /// An answer is committed only when confidence is strictly above this.
    pub answer_confidence_gate: f64,
    /// Chunks with cosine similarity strictly above this count as related.
    pub similarity_threshold: f32,
    /// Links above this relevance are cited as evidence during extraction.
    pub related_link_floor: f64,
}

impl ExploreConfig {
    /// Build a runtime config for the given site root with standard limits.
    pub fn new(site_root: Url) -> Self {
        Self {
            site_root,
            max_pages_per_question: default_max_pages(),
            chunk_max_chars: default_chunk_max_chars(),
            enqueue_floor: 0.3,
            answer_confidence_gate: 0.8,
            similarity_threshold: 0.8,
            related_link_floor: 0.7,
        }
    }

    /// Merge the app config with an optional site-root override.
    pub fn from_app(config: &AppConfig, site_override: Option<&str>) -> Result<Self> {
        let raw = site_override
            .or(config.defaults.site_root.as_deref())
            .ok_or_else(|| {
                ScoutError::config("no site root configured; pass --site or set defaults.site_root")
            })?;
        let site_root = Url::parse(raw)
            .map_err(|e| ScoutError::config(format!("invalid site root {raw}: {e}")))?;

        let mut explore = Self::new(site_root);
        explore.max_pages_per_question = config.defaults.max_pages_per_question;
        explore.chunk_max_chars = config.defaults.chunk_max_chars;
        Ok(explore)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.answerscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.answerscout/answerscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the oracle API key env var is set and non-empty, returning the key.
pub fn validate_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.openai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ScoutError::config(format!(
            "oracle API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_pages_per_question"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_pages_per_question, 10);
        assert_eq!(parsed.defaults.chunk_max_chars, 1000);
        assert_eq!(parsed.openai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn explore_config_requires_site_root() {
        let config = AppConfig::default();
        let result = ExploreConfig::from_app(&config, None);
        assert!(result.is_err());
    }

    #[test]
    fn explore_config_override_wins() {
        let mut config = AppConfig::default();
        config.defaults.site_root = Some("https://configured.example".into());

        let explore =
            ExploreConfig::from_app(&config, Some("https://flag.example")).expect("merge");
        assert_eq!(explore.site_root.as_str(), "https://flag.example/");
        assert_eq!(explore.max_pages_per_question, 10);
        assert_eq!(explore.enqueue_floor, 0.3);
        assert_eq!(explore.answer_confidence_gate, 0.8);
    }

    #[test]
    fn explore_config_rejects_bad_url() {
        let config = AppConfig::default();
        let result = ExploreConfig::from_app(&config, Some("not a url"));
        assert!(result.is_err());
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.openai.api_key_env = "AS_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
