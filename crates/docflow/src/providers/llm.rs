//! Language model boundary

use async_trait::async_trait;

use crate::error::Result;

/// Language model interface: a prompt in, generated text out. Decoding
/// parameters (temperature, token budget) are fixed by the implementation's
/// configuration.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// The model being used
    fn model(&self) -> &str;
}
