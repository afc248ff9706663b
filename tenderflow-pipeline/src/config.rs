use serde::Deserialize;
use std::path::PathBuf;

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-5".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_analysis_max_in_flight() -> usize {
    8
}

/// Generative-model provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Document conversion/extraction service settings
#[derive(Debug, Clone, Deserialize)]
pub struct StirlingConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Process-wide pipeline configuration, constructed once at startup and
/// passed by reference into each component. There is no ambient global
/// lookup anywhere else in the crate.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub openai: OpenAIConfig,
    pub stirling: StirlingConfig,
    /// Public base URL prepended to a media item's object key when the item
    /// carries no explicit URL.
    pub media_base_url: String,
    /// Cap on concurrent analysis requests. Media ingestion is sequential
    /// by construction and has no equivalent knob.
    #[serde(default = "default_analysis_max_in_flight")]
    pub analysis_max_in_flight: usize,
}

/// Load configuration from a TOML file.
pub fn load_config(path: &PathBuf) -> anyhow::Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&content)?;
    Ok(config)
}

impl PipelineConfig {
    /// Build a configuration from environment variables, for deployments
    /// that do not ship a config file.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
        let stirling_base_url = std::env::var("STIRLING_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Ok(Self {
            openai: OpenAIConfig {
                api_key,
                base_url: std::env::var("OPENAI_API_URL")
                    .unwrap_or_else(|_| default_openai_base_url()),
                model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| default_model()),
                request_timeout_secs: default_request_timeout_secs(),
            },
            stirling: StirlingConfig {
                base_url: stirling_base_url,
                api_key: std::env::var("STIRLING_API_KEY").unwrap_or_default(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            media_base_url: std::env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000/media".to_string()),
            analysis_max_in_flight: default_analysis_max_in_flight(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_applies_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            media_base_url = "https://media.example.com"

            [openai]
            api_key = "sk-test"

            [stirling]
            base_url = "http://stirling:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.openai.base_url, "https://api.openai.com");
        assert_eq!(config.openai.model, "gpt-5");
        assert_eq!(config.stirling.api_key, "");
        assert_eq!(config.analysis_max_in_flight, 8);
    }

    #[test]
    fn test_explicit_values_win() {
        let config: PipelineConfig = toml::from_str(
            r#"
            media_base_url = "https://media.example.com"
            analysis_max_in_flight = 2

            [openai]
            api_key = "sk-test"
            model = "gpt-5-mini"

            [stirling]
            base_url = "http://stirling:8080"
            api_key = "stirling-key"
            "#,
        )
        .unwrap();

        assert_eq!(config.openai.model, "gpt-5-mini");
        assert_eq!(config.stirling.api_key, "stirling-key");
        assert_eq!(config.analysis_max_in_flight, 2);
    }
}
