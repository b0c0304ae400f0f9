// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    /// Base URL of the external profile document store.
    pub docstore_url: String,

    /// OpenRouter credentials for the AI tutor. When absent the gateway
    /// still answers, with its canned degradation message.
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,

    pub rust_log: String,
    pub port: u16,

    /// Insert a small demo question bank at startup when the store is empty.
    pub seed_sample_questions: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let docstore_url = env::var("DOCSTORE_URL").expect("DOCSTORE_URL must be set");

        let openrouter_api_key = env::var("OPENROUTER_API_KEY").ok();

        let openrouter_base_url = env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());

        let openrouter_model = env::var("OPENROUTER_MODEL")
            .unwrap_or_else(|_| "anthropic/claude-3-opus".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let seed_sample_questions = env::var("SEED_SAMPLE_QUESTIONS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            database_url,
            docstore_url,
            openrouter_api_key,
            openrouter_base_url,
            openrouter_model,
            rust_log,
            port,
            seed_sample_questions,
        }
    }
}
