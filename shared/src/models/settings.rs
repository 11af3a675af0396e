use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and sampling settings for the story generation service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: "tngtech/deepseek-r1t2-chimera:free".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
