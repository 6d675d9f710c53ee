//! Tunables for a comparison run

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Characters kept from each paper before prompting
pub const DEFAULT_TEXT_CHAR_LIMIT: usize = 4000;
/// Entries kept in each keyword mapping
pub const DEFAULT_KEYWORD_LIMIT: usize = 30;
pub const DEFAULT_KPI_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_HIGHLIGHTS_MAX_TOKENS: u32 = 200;

/// Configuration shared by every comparison a process runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparatorConfig {
    /// Chat-completion model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_kpi_max_tokens")]
    pub kpi_max_tokens: u32,

    #[serde(default = "default_highlights_max_tokens")]
    pub highlights_max_tokens: u32,

    #[serde(default = "default_text_char_limit")]
    pub text_char_limit: usize,

    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_kpi_max_tokens() -> u32 {
    DEFAULT_KPI_MAX_TOKENS
}

fn default_highlights_max_tokens() -> u32 {
    DEFAULT_HIGHLIGHTS_MAX_TOKENS
}

fn default_text_char_limit() -> usize {
    DEFAULT_TEXT_CHAR_LIMIT
}

fn default_keyword_limit() -> usize {
    DEFAULT_KEYWORD_LIMIT
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_api_base_url(),
            kpi_max_tokens: DEFAULT_KPI_MAX_TOKENS,
            highlights_max_tokens: DEFAULT_HIGHLIGHTS_MAX_TOKENS,
            text_char_limit: DEFAULT_TEXT_CHAR_LIMIT,
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }
}

impl ComparatorConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
