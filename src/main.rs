mod agent;
mod config;
mod instrumentation;
mod llm;
mod render;
mod search;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use agent::Assistant;
use config::{Config, ConfigSource};
use session::{HistoryEntry, SessionHistory};

#[derive(Parser)]
#[command(
    name = "research-assistant",
    about = "Ask a question, get a web-sourced answer with citations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging and per-turn summaries
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Load configuration from this dotenv file
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question to research
        question: String,
    },
    /// Interactive session; `/history` lists past turns, `/quit` exits
    Chat,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let source = match cli.env_file {
        Some(path) => ConfigSource::EnvFile(path),
        None => ConfigSource::Environment,
    };
    let config = Config::load(&source)?;
    tracing::debug!(?config, "Configuration loaded");

    let assistant = Assistant::from_config(&config)?;
    tracing::info!(model = assistant.model(), "Assistant ready");

    match cli.command {
        Commands::Ask { question } => {
            anyhow::ensure!(!question.trim().is_empty(), "Question must not be empty");
            let mut history = SessionHistory::new();
            run_turn(&assistant, &mut history, &question, cli.verbose).await;
        }
        Commands::Chat => chat(&assistant, cli.verbose).await?,
    }

    Ok(())
}

async fn chat(assistant: &Assistant, verbose: bool) -> Result<()> {
    let mut history = SessionHistory::new();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Ask a question. `/history` shows past turns, `/quit` exits.");
    loop {
        print!("? ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read line")?;
        let question = line.trim();

        match question {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => print!("{}", render::render_history(history.all())),
            _ => run_turn(assistant, &mut history, question, verbose).await,
        }
    }

    Ok(())
}

async fn run_turn(
    assistant: &Assistant,
    history: &mut SessionHistory,
    question: &str,
    verbose: bool,
) {
    eprintln!("Searching and generating answer...");
    let (answer, turn) = assistant.ask(question).await;

    let entry = HistoryEntry {
        question: question.to_string(),
        answer,
    };
    println!("\n{}", render::render_entry(&entry));
    if verbose {
        println!("{}", turn.summary());
    }

    history.append(entry);
}
