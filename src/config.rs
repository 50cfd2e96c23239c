use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OpenAI-compatible API key; enables the "openai" provider
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Vision model used by the "openai" provider
    #[serde(default = "default_openai_vision_model")]
    pub openai_vision_model: String,

    /// Text model used by the "openai" provider for recommendation generation
    #[serde(default = "default_openai_text_model")]
    pub openai_text_model: String,

    /// Custom LLM API key; enables the "custom" provider
    #[serde(default)]
    pub custom_llm_api_key: Option<String>,

    /// Custom LLM API base URL
    #[serde(default = "default_custom_base_url")]
    pub custom_llm_base_url: String,

    /// Vision model used by the "custom" provider
    #[serde(default = "default_custom_vision_model")]
    pub custom_vision_model: String,

    /// Text model used by the "custom" provider
    #[serde(default = "default_custom_text_model")]
    pub custom_text_model: String,

    /// Name of the provider tried first ("openai" or "custom")
    #[serde(default = "default_primary_provider")]
    pub primary_llm_provider: String,

    /// Per-provider attempt timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Redis connection URL for analytics counters; unset disables analytics
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Local directory where uploaded images are staged for URL-only providers
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,

    /// Public base URL under which staged images are reachable
    #[serde(default = "default_staging_base_url")]
    pub staging_base_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_vision_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_custom_base_url() -> String {
    "https://api.avalai.ir/v1".to_string()
}

fn default_custom_vision_model() -> String {
    "aval-vision-large".to_string()
}

fn default_custom_text_model() -> String {
    "aval-llama-3-70b".to_string()
}

fn default_primary_provider() -> String {
    "openai".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_staging_dir() -> String {
    "staged_images".to_string()
}

fn default_staging_base_url() -> String {
    "http://localhost:3000/staged".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
