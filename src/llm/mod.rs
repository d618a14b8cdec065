pub mod cohere;

pub use cohere::{CohereApiVersion, CohereClient};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[async_trait]
pub trait AnswerClient: Send + Sync {
    async fn chat(&self, model: &str, message: &str, temperature: f32) -> Result<LlmResponse>;
}

/// Turns a raw chat response body into answer text.
///
/// Response shapes differ across API versions, so each version gets its own
/// adapter. Adapters never fail: if the expected field is missing they fall
/// back to the serialized body so the caller still sees what came back.
pub trait ResponseAdapter: Send + Sync + std::fmt::Debug {
    fn extract_text(&self, response: &Value) -> String;
}
