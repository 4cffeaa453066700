//! Text generation service used to author quizzes

mod http_backend;

pub use http_backend::*;

use crate::config::GenerationConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produce raw completion text for a system and user prompt
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
    fn model_name(&self) -> &str;
}

pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn GenerationService>> {
    let generator = HttpGenerator::new(config)?;
    Ok(Arc::new(generator))
}
