//! LLM Module - generative model boundary used for answer synthesis

use anyhow::Result;
use async_trait::async_trait;

pub mod gemini;

pub use gemini::GeminiProvider;

/// Core trait for text generation backends.
///
/// An empty completion is a valid result; callers decide how to present it.
/// Whitespace-only text is not treated as empty.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for std::sync::Arc<T> {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        (**self).complete(system_instruction, user_prompt, temperature).await
    }
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Box<T> {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        (**self).complete(system_instruction, user_prompt, temperature).await
    }
}
