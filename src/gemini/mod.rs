//! Hosted text generation (Gemini).
//!
//! Only the draft generator calls this; every failure is absorbed there.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

pub use client::GeminiClient;

/// Gemini configuration stored in ~/.vortex/config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_enabled() -> bool {
    true
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            model: default_model(),
        }
    }
}

impl GeminiConfig {
    /// True when drafts should go to the hosted model at all.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Single-prompt completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}
