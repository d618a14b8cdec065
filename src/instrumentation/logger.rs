use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::agent::Outcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnLog {
    pub id: String,
    pub timestamp: String,
    pub question: String,
    pub outcome: Outcome,
    pub num_sources: u32,
    pub search_latency_ms: u64,
    pub generation_latency_ms: Option<u64>,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_latency_ms: u64,
}

impl TurnLog {
    pub fn new(question: &str, outcome: Outcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            question: question.to_string(),
            outcome,
            num_sources: 0,
            search_latency_ms: 0,
            generation_latency_ms: None,
            input_tokens: 0,
            output_tokens: 0,
            total_latency_ms: 0,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    pub fn summary(&self) -> String {
        let generation = match self.generation_latency_ms {
            Some(ms) => format!("{:.1}s", ms as f64 / 1000.0),
            None => "skipped".to_string(),
        };
        format!(
            "Outcome: {} | Sources: {} | Search: {:.1}s | Generation: {} | Tokens used by LLM: {} | Total latency: {:.1}s",
            self.outcome,
            self.num_sources,
            self.search_latency_ms as f64 / 1000.0,
            generation,
            self.total_tokens(),
            self.total_latency_ms as f64 / 1000.0,
        )
    }
}

/// Appends one JSON line per turn to `<dir>/turns.jsonl`.
#[derive(Debug, Clone)]
pub struct TurnLogger {
    path: PathBuf,
}

impl TurnLogger {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create turn log directory")?;
        Ok(Self {
            path: dir.join("turns.jsonl"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, turn: &TurnLog) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open turn log file")?;

        let json = serde_json::to_string(turn).context("Failed to serialize turn log")?;
        writeln!(file, "{}", json).context("Failed to write turn log")?;

        Ok(())
    }
}
