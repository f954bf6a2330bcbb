//! Command-line front end for the legal responder

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use legal_responder::completion::HttpCompletionClient;
use legal_responder::config::ResponderConfig;
use legal_responder::store::RestStore;
use legal_responder::{normalize, score_all, tokenize, Catalog, Responder};

#[derive(Parser)]
#[command(name = "legal-responder", version, about = "Answer Arabic legal questions")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question
    Ask {
        question: String,
        /// Try the completion service first
        #[arg(long)]
        ai: bool,
        #[arg(long, default_value = "cli")]
        user: String,
    },
    /// Print every intent's score for a question as JSON
    Score { question: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ResponderConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let mut config = ResponderConfig::default();
            config.apply_env();
            config
        }
    };

    let catalog = Catalog::builtin();

    match cli.command {
        Command::Ask { question, ai, user } => {
            let ai_enabled = ai || config.ai_enabled;
            info!(ai_enabled, "legal-responder v{} answering", env!("CARGO_PKG_VERSION"));

            let mut responder = Responder::new(catalog);
            if ai_enabled {
                let client = HttpCompletionClient::new(&config.completion)?;
                responder = responder.with_completion(Box::new(client), config.completion.clone());
            }
            if let Some(store) = RestStore::from_config(&config.store)? {
                responder = responder.with_store(Box::new(store), config.store.tables.clone());
            }

            let reply = responder.respond(&user, &question, ai_enabled);
            println!("[{}] {}", reply.source.as_str(), reply.text);
        }
        Command::Score { question } => {
            let normalized = normalize(&question);
            let tokens = tokenize(&normalized);
            let scores: Vec<_> = score_all(&normalized, &tokens, catalog.intents())
                .into_iter()
                .map(|s| serde_json::json!({ "intent": s.intent.id, "score": s.score }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
    }

    Ok(())
}
