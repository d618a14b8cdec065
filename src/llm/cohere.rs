use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

use super::{AnswerClient, LlmResponse, ResponseAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CohereApiVersion {
    #[default]
    V1,
    V2,
}

impl FromStr for CohereApiVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => anyhow::bail!("Unsupported Cohere API version: {}", other),
        }
    }
}

impl CohereApiVersion {
    fn endpoint(self) -> &'static str {
        match self {
            Self::V1 => "v1/chat",
            Self::V2 => "v2/chat",
        }
    }

    fn adapter(self) -> Box<dyn ResponseAdapter> {
        match self {
            Self::V1 => Box::new(V1TextAdapter),
            Self::V2 => Box::new(V2MessageAdapter),
        }
    }

    fn usage_pointer(self) -> &'static str {
        match self {
            Self::V1 => "/meta/billed_units",
            Self::V2 => "/usage/billed_units",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum ChatRequest<'a> {
    V1(V1ChatRequest<'a>),
    V2(V2ChatRequest<'a>),
}

#[derive(Debug, Clone, Serialize)]
struct V1ChatRequest<'a> {
    model: &'a str,
    message: &'a str,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct V2ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// v1 responses carry the answer in a top-level `text` field.
#[derive(Debug, Clone, Copy)]
pub struct V1TextAdapter;

impl ResponseAdapter for V1TextAdapter {
    fn extract_text(&self, response: &Value) -> String {
        response
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| response.to_string())
    }
}

/// v2 responses carry a list of content blocks under `message.content`.
#[derive(Debug, Clone, Copy)]
pub struct V2MessageAdapter;

impl ResponseAdapter for V2MessageAdapter {
    fn extract_text(&self, response: &Value) -> String {
        let blocks = response
            .pointer("/message/content")
            .and_then(Value::as_array);

        match blocks {
            Some(blocks) => {
                let text = blocks
                    .iter()
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("");
                if text.is_empty() {
                    response.to_string()
                } else {
                    text
                }
            }
            None => response.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct CohereClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    version: CohereApiVersion,
    adapter: Box<dyn ResponseAdapter>,
}

impl CohereClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        version: CohereApiVersion,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build Cohere HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            version,
            adapter: version.adapter(),
        })
    }

    fn request_body<'a>(
        &self,
        model: &'a str,
        message: &'a str,
        temperature: f32,
    ) -> ChatRequest<'a> {
        match self.version {
            CohereApiVersion::V1 => ChatRequest::V1(V1ChatRequest {
                model,
                message,
                temperature,
            }),
            CohereApiVersion::V2 => ChatRequest::V2(V2ChatRequest {
                model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: message,
                }],
                temperature,
            }),
        }
    }
}

#[async_trait]
impl AnswerClient for CohereClient {
    async fn chat(&self, model: &str, message: &str, temperature: f32) -> Result<LlmResponse> {
        let request = self.request_body(model, message, temperature);

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, self.version.endpoint()))
            .bearer_auth(&self.api_key)
            .header("accept", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Cohere API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Cohere API error ({}): {}", status, body);
        }

        let api_response: Value = response
            .json()
            .await
            .context("Failed to parse Cohere API response")?;

        let usage = api_response.pointer(self.version.usage_pointer());
        let tokens = |field: &str| {
            usage
                .and_then(|u| u.get(field))
                .and_then(Value::as_f64)
                .map(|n| n as u32)
                .unwrap_or(0)
        };

        Ok(LlmResponse {
            text: self.adapter.extract_text(&api_response),
            input_tokens: tokens("input_tokens"),
            output_tokens: tokens("output_tokens"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn v1_adapter_reads_text_field() {
        let body = json!({"text": "Rust is memory safe [1].", "generation_id": "abc"});
        assert_eq!(V1TextAdapter.extract_text(&body), "Rust is memory safe [1].");
    }

    #[test]
    fn v1_adapter_falls_back_to_whole_body() {
        let body = json!({"unexpected": true});
        assert_eq!(V1TextAdapter.extract_text(&body), r#"{"unexpected":true}"#);
    }

    #[test]
    fn v2_adapter_joins_text_blocks() {
        let body = json!({
            "message": {
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "First part. "},
                    {"type": "text", "text": "Second part [2]."}
                ]
            }
        });
        assert_eq!(
            V2MessageAdapter.extract_text(&body),
            "First part. Second part [2]."
        );
    }

    #[test]
    fn version_parses_case_insensitively() {
        assert_eq!("V2".parse::<CohereApiVersion>().unwrap(), CohereApiVersion::V2);
        assert_eq!("v1".parse::<CohereApiVersion>().unwrap(), CohereApiVersion::V1);
        assert!("v3".parse::<CohereApiVersion>().is_err());
    }

    #[tokio::test]
    async fn v1_chat_sends_message_and_reports_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .and(header("authorization", "Bearer co-test-key"))
            .and(body_partial_json(json!({
                "model": "command-a-03-2025",
                "message": "What is Rust?"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "A systems language [1].",
                "meta": {"billed_units": {"input_tokens": 120, "output_tokens": 9}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            CohereClient::new("co-test-key", &server.uri(), CohereApiVersion::V1, None).unwrap();
        let response = client
            .chat("command-a-03-2025", "What is Rust?", 0.3)
            .await
            .unwrap();

        assert_eq!(response.text, "A systems language [1].");
        assert_eq!(response.input_tokens, 120);
        assert_eq!(response.output_tokens, 9);
    }

    #[tokio::test]
    async fn v2_chat_sends_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/chat"))
            .and(body_partial_json(json!({
                "messages": [{"role": "user", "content": "Why?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"content": [{"type": "text", "text": "Because."}]},
                "usage": {"billed_units": {"input_tokens": 3, "output_tokens": 1}}
            })))
            .mount(&server)
            .await;

        let client =
            CohereClient::new("co-test-key", &server.uri(), CohereApiVersion::V2, None).unwrap();
        let response = client.chat("command-a-03-2025", "Why?", 0.3).await.unwrap();

        assert_eq!(response.text, "Because.");
        assert_eq!(response.input_tokens, 3);
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
            .mount(&server)
            .await;

        let client =
            CohereClient::new("co-test-key", &server.uri(), CohereApiVersion::V1, None).unwrap();
        let err = client.chat("m", "q", 0.3).await.unwrap_err();

        assert!(err.to_string().contains("429"));
    }
}
