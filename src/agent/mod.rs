pub mod context;
pub mod prompt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::instrumentation::{TurnLog, TurnLogger};
use crate::llm::{AnswerClient, CohereClient};
use crate::search::{SearchClient, SearchDepth, SearchResult, TavilyClient};

use context::build_context;
use prompt::compose_prompt;

pub const SEARCH_DEPTH: SearchDepth = SearchDepth::Basic;
pub const MAX_RESULTS: u32 = 5;
pub const TEMPERATURE: f32 = 0.3;

pub const MISSING_CLIENTS_MESSAGE: &str = "Missing API clients. Check API keys.";
pub const NO_RESULTS_MESSAGE: &str = "No information found on this topic.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Answered,
    NoResults,
    MissingClients,
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Answered => "answered",
            Self::NoResults => "no results",
            Self::MissingClients => "missing clients",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The result of one turn. `sources` are the untruncated search results,
/// in the order the model saw them.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
    pub outcome: Outcome,
}

impl Answer {
    fn without_sources(text: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
            outcome,
        }
    }
}

pub struct Assistant {
    search: Option<Arc<dyn SearchClient>>,
    generator: Option<Arc<dyn AnswerClient>>,
    model: String,
    logger: Option<TurnLogger>,
}

impl Assistant {
    pub fn new(
        search: Option<Arc<dyn SearchClient>>,
        generator: Option<Arc<dyn AnswerClient>>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            search,
            generator,
            model: model.into(),
            logger: None,
        }
    }

    /// Builds both HTTP clients once. A client that fails to build is left
    /// out, and every turn then reports missing clients instead of failing
    /// startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let search: Option<Arc<dyn SearchClient>> = match TavilyClient::new(
            &config.tavily_api_key,
            &config.tavily_base_url,
            config.request_timeout,
        ) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to initialize search client");
                None
            }
        };

        let generator: Option<Arc<dyn AnswerClient>> = match CohereClient::new(
            &config.cohere_api_key,
            &config.cohere_base_url,
            config.cohere_api_version,
            config.request_timeout,
        ) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to initialize generation client");
                None
            }
        };

        let mut assistant = Self::new(search, generator, config.cohere_model.clone());
        if let Some(dir) = &config.turn_log_dir {
            let logger = TurnLogger::new(dir)?;
            tracing::info!(path = %logger.path().display(), "Writing turn log");
            assistant = assistant.with_logger(logger);
        }

        Ok(assistant)
    }

    pub fn with_logger(mut self, logger: TurnLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs one turn and returns the answer along with its metrics. Never
    /// fails: every error becomes an `Error:` answer with no sources.
    pub async fn ask(&self, question: &str) -> (Answer, TurnLog) {
        let run_start = Instant::now();
        let mut turn = TurnLog::new(question, Outcome::Failed);

        let answer = match (&self.search, &self.generator) {
            (Some(search), Some(generator)) => {
                match self
                    .search_and_answer(question, search.as_ref(), generator.as_ref(), &mut turn)
                    .await
                {
                    Ok(answer) => answer,
                    Err(e) => {
                        tracing::error!(error = ?e, question, "Turn failed");
                        Answer::without_sources(format!("Error: {:#}", e), Outcome::Failed)
                    }
                }
            }
            _ => {
                tracing::warn!("Question received without API clients");
                Answer::without_sources(MISSING_CLIENTS_MESSAGE, Outcome::MissingClients)
            }
        };

        turn.outcome = answer.outcome;
        turn.num_sources = answer.sources.len() as u32;
        turn.total_latency_ms = run_start.elapsed().as_millis() as u64;

        tracing::info!(
            outcome = %turn.outcome,
            sources = turn.num_sources,
            latency_ms = turn.total_latency_ms,
            "Turn complete"
        );

        if let Some(logger) = &self.logger {
            if let Err(e) = logger.write(&turn) {
                tracing::warn!(error = ?e, "Failed to write turn log");
            }
        }

        (answer, turn)
    }

    async fn search_and_answer(
        &self,
        question: &str,
        search: &dyn SearchClient,
        generator: &dyn AnswerClient,
        turn: &mut TurnLog,
    ) -> Result<Answer> {
        let search_start = Instant::now();
        let searched = search.query(question, SEARCH_DEPTH, MAX_RESULTS).await;
        turn.search_latency_ms = search_start.elapsed().as_millis() as u64;
        let sources = searched?;

        tracing::debug!(
            results = sources.len(),
            latency_ms = turn.search_latency_ms,
            "Search finished"
        );

        if sources.is_empty() {
            return Ok(Answer::without_sources(NO_RESULTS_MESSAGE, Outcome::NoResults));
        }

        let context = build_context(&sources);
        let prompt = compose_prompt(question, &context);

        let generation_start = Instant::now();
        let response = generator.chat(&self.model, &prompt, TEMPERATURE).await?;
        turn.generation_latency_ms = Some(generation_start.elapsed().as_millis() as u64);
        turn.input_tokens = response.input_tokens;
        turn.output_tokens = response.output_tokens;

        tracing::debug!(
            model = %self.model,
            latency_ms = turn.generation_latency_ms,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Generation finished"
        );

        Ok(Answer {
            text: response.text,
            sources,
            outcome: Outcome::Answered,
        })
    }
}
