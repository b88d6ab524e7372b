//! Configuration (layered: code > env > `.env` file).

pub mod state_file;

pub use state_file::load_state_file;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Layered configuration for model providers.
///
/// Values set in code override those read from the environment.
#[derive(Debug, Clone, Default)]
pub struct StatecraftConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
}

impl StatecraftConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (GOOGLE_API_KEY, GEMINI_API_KEY, ...).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let config = Self::new();

        // Later entries win for the same provider.
        let env_mappings = [("GOOGLE_API_KEY", "google"), ("GEMINI_API_KEY", "google")];

        for (env_var, provider) in &env_mappings {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(provider, key);
            }
        }

        let url_mappings = [("GOOGLE_BASE_URL", "google")];

        for (env_var, provider) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        config
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.read().ok()?.get(provider).cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.read().ok()?.get(provider).cloned()
    }

    /// Check if a provider has an API key configured.
    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }
}
