use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{SearchClient, SearchDepth, SearchResult, DEFAULT_TITLE};

#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Clone, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: SearchDepth,
    max_results: u32,
}

// Every field is optional on the wire; defaults are applied in `From`.
#[derive(Debug, Clone, Deserialize)]
struct RawResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

impl From<RawResult> for SearchResult {
    fn from(raw: RawResult) -> Self {
        Self::new(
            raw.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            raw.url.unwrap_or_default(),
            raw.content.unwrap_or_default(),
        )
    }
}

impl TavilyClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build Tavily HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn query(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: u32,
    ) -> Result<Vec<SearchResult>> {
        let request = SearchRequest {
            query,
            search_depth: depth,
            max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Tavily API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Tavily API error ({}): {}", status, body);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse Tavily API response")?;

        Ok(parse_results(body))
    }
}

/// Pulls `results` out of a search response. Anything that isn't a list of
/// objects under `results` is treated as no results.
fn parse_results(body: Value) -> Vec<SearchResult> {
    let Value::Object(mut map) = body else {
        tracing::warn!("Tavily response was not a JSON object");
        return Vec::new();
    };

    let Some(Value::Array(items)) = map.remove("results") else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawResult>(item) {
            Ok(raw) => Some(SearchResult::from(raw)),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed search result");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TavilyClient {
        TavilyClient::new("tv-test-key", &server.uri(), None).unwrap()
    }

    #[tokio::test]
    async fn query_sends_depth_and_limit_and_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tv-test-key"))
            .and(body_partial_json(json!({
                "query": "rust borrow checker",
                "search_depth": "basic",
                "max_results": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "rust borrow checker",
                "results": [
                    {
                        "title": "The Rust Book",
                        "url": "https://doc.rust-lang.org/book/",
                        "content": "Ownership rules",
                        "score": 0.92
                    },
                    {"url": "https://example.com", "content": "No title here"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client(&server)
            .query("rust borrow checker", SearchDepth::Basic, 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "The Rust Book");
        assert_eq!(results[0].content, "Ownership rules");
        assert_eq!(results[1].title, "No title");
        assert_eq!(results[1].url, "https://example.com");
    }

    #[tokio::test]
    async fn missing_results_key_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": null})))
            .mount(&server)
            .await;

        let results = client(&server)
            .query("anything", SearchDepth::Basic, 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn http_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client(&server)
            .query("anything", SearchDepth::Basic, 5)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid api key"));
    }

    #[test]
    fn non_object_body_is_empty() {
        assert!(parse_results(json!(["not", "a", "map"])).is_empty());
        assert!(parse_results(json!({"results": "nope"})).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let results = parse_results(json!({
            "results": [
                42,
                {"title": null, "url": "https://a.example", "content": "kept"}
            ]
        }));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "No title");
        assert_eq!(results[0].content, "kept");
    }
}
