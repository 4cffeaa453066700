//! Default values for configuration

/// Default OpenAI-compatible API base URL
pub fn default_generation_base_url() -> String {
    std::env::var("STUDY_HELPER_GENERATION_URL")
        .unwrap_or_else(|_| "https://api.openai.com".to_string())
}

/// Default chat model used for quiz generation
pub fn default_generation_model() -> String {
    "gpt-4".to_string()
}

/// Default environment variable holding the API key
pub fn default_generation_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default generation request timeout in seconds
pub fn default_generation_timeout() -> u64 {
    120
}

/// Default sampling temperature (None = provider default)
pub fn default_generation_temperature() -> Option<f32> {
    None
}

/// Default page size for search results
pub fn default_search_limit() -> u32 {
    10
}

/// Default sort mode for search results
pub fn default_search_sort() -> String {
    "relevance".to_string()
}

/// Default database file name inside the base directory
pub fn default_db_file_name() -> &'static str {
    "study-helper.db"
}
