use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; when unset the service falls back to the
    /// in-memory store (useful for local development and tests)
    #[serde(default)]
    pub database_url: Option<String>,

    /// Secret used to sign and verify bearer tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Bearer token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// API key for the external text-generation service
    #[serde(default)]
    pub openai_api_key: String,

    /// Base URL of the external text-generation service
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Upper bound on a single text-generation call, in seconds
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_openai_api_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    15
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
