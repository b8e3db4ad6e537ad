//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - run: Full pipeline (split, process, aggregate)
//! - smart: Fast path with early exit
//! - context: Save, load, list and clear stored context
//! - exec: Local execution environment

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::cli::{ContextAction, TaskArgs};
use crate::conductor::{Conductor, PipelineLimits, SmartConductor};
use crate::config::{validate_threshold, Config};
use crate::context_store::ContextStore;
use crate::llm::ollama::OllamaProvider;
use crate::llm::InferenceClient;
use crate::repl::{ExecOutcome, LocalRepl};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

const BANNER_WIDTH: usize = 60;

/// Build the inference client from config, honouring a `--model` override
pub fn build_client(config: &Config, model_override: Option<&str>) -> InferenceClient {
    let provider = OllamaProvider::with_timeout(
        config.llm.ollama.base_url.clone(),
        config.llm.request_timeout(),
    );
    let model = model_override.unwrap_or(&config.llm.ollama.model);
    InferenceClient::new(Arc::new(provider), model)
}

/// Resolve a `--context` argument: file contents if it names an existing
/// file, the literal text otherwise.
pub async fn load_context(arg: &str) -> Result<String> {
    if arg.is_empty() {
        return Ok(String::new());
    }

    let path = Path::new(arg);
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);

    if is_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read context file {}", path.display()))?;
        info!("Context loaded from {} ({} chars)", path.display(), text.chars().count());
        Ok(text)
    } else {
        Ok(arg.to_string())
    }
}

async fn warn_if_unreachable(client: &InferenceClient, config: &Config) {
    if !client.check_health().await {
        warn!(
            "Ollama at {} is not responding; every stage will degrade to its fallback",
            config.llm.ollama.base_url
        );
    }
}

/// Run the full pipeline
pub async fn handle_run(args: TaskArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let context = load_context(&args.context).await?;
    let client = build_client(config, args.model.as_deref());
    info!("Model: {}", client.model());
    warn_if_unreachable(&client, config).await;

    let conductor = Conductor::new(client, PipelineLimits::from(&config.pipeline));

    let start = Instant::now();
    let answer = conductor.run(&args.task, &context).await;
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    match format {
        OutputFormat::Text => {
            println!("{}", "=".repeat(BANNER_WIDTH));
            println!("[RESULT]");
            println!("{}", "=".repeat(BANNER_WIDTH));
            println!("{}", answer);
            println!();
            println!("Time: {}ms", elapsed_ms);
        }
        OutputFormat::Json => {
            let output = json!({
                "resposta": answer,
                "modo": "full",
                "tempo_ms": elapsed_ms
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Run the smart pipeline
///
/// Text output ends with a single `[JSON] {...}` line holding the result
/// record, for callers that scrape stdout.
pub async fn handle_smart(
    args: TaskArgs,
    confidence: Option<f64>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let threshold = confidence.unwrap_or(config.pipeline.confidence_threshold);
    validate_threshold(threshold)?;

    let context = load_context(&args.context).await?;
    let client = build_client(config, args.model.as_deref());
    info!("Model: {} | threshold {:.2}", client.model(), threshold);
    warn_if_unreachable(&client, config).await;

    let smart = SmartConductor::new(client, PipelineLimits::from(&config.pipeline))
        .with_threshold(threshold);
    let record = smart.run(&args.task, &context).await;

    match format {
        OutputFormat::Text => {
            println!("{}", "=".repeat(BANNER_WIDTH));
            println!(
                "[RESULT] mode={} | confidence={:.0}% | time={}ms",
                record.mode,
                record.confidence * 100.0,
                record.elapsed_ms
            );
            println!("{}", "=".repeat(BANNER_WIDTH));
            println!("{}", record.answer);
            println!();
            println!("[JSON] {}", serde_json::to_string(&record)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}

/// Context store commands
pub async fn handle_context(
    action: ContextAction,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let base_dir = config.context_dir();
    let store = ContextStore::open(&base_dir)
        .await
        .with_context(|| format!("Failed to open context store at {}", base_dir.display()))?;

    match action {
        ContextAction::Save {
            user_id,
            file,
            kind,
        } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let mut metadata = Map::new();
            metadata.insert("kind".to_string(), Value::String(kind));
            metadata.insert(
                "source_file".to_string(),
                Value::String(file.display().to_string()),
            );

            let path = store.save(&user_id, &text, Some(metadata)).await?;
            match format {
                OutputFormat::Text => {
                    println!("Saved context for '{}' to {}", user_id, path.display())
                }
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "user_id": user_id,
                        "path": path,
                        "bytes": text.len()
                    }))?
                ),
            }
        }

        ContextAction::Load { user_id, output } => {
            let text = store.load(&user_id).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &text)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    match format {
                        OutputFormat::Text => {
                            println!("Context for '{}' written to {}", user_id, path.display())
                        }
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::to_string_pretty(&written_json(&user_id, &path))?
                        ),
                    }
                }
                None => match format {
                    OutputFormat::Text => println!("{}", text),
                    OutputFormat::Json => {
                        let metadata = store.load_metadata(&user_id).await?;
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({
                                "user_id": user_id,
                                "text": text,
                                "metadata": metadata
                            }))?
                        );
                    }
                },
            }
        }

        ContextAction::List => {
            let entries = store.list().await?;
            match format {
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("No stored contexts in {}", store.base_dir().display());
                        return Ok(());
                    }

                    println!("Stored contexts ({}):", store.base_dir().display());
                    for entry in &entries {
                        println!("  {} ({})", entry.name, entry.display_size());
                    }
                }
                OutputFormat::Json => {
                    let items: Vec<Value> = entries
                        .iter()
                        .map(|e| {
                            json!({
                                "name": e.name,
                                "size": e.size,
                                "path": e.location
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "contexts": items,
                            "count": entries.len()
                        }))?
                    );
                }
            }
        }

        ContextAction::Clear { user_id } => {
            let removed = store.delete(&user_id).await?;
            match format {
                OutputFormat::Text if removed => println!("Context for '{}' removed", user_id),
                OutputFormat::Text => println!("No context stored for '{}'", user_id),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "user_id": user_id,
                        "removed": removed
                    }))?
                ),
            }
        }

        ContextAction::Put { name, file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let path = store.save_file(&name, &content).await?;
            match format {
                OutputFormat::Text => println!("Saved {} to {}", name, path.display()),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "name": name, "path": path }))?
                ),
            }
        }
    }

    Ok(())
}

/// JSON reply for `context load --output`
fn written_json(user_id: &str, path: &Path) -> Value {
    json!({ "user_id": user_id, "path": path })
}

/// Execute a snippet in the local execution environment
///
/// Code comes from `--code`, `--file`, or stdin when neither is given.
/// A failing snippet is reported, not returned as an error.
pub async fn handle_exec(
    code: Option<String>,
    file: Option<&Path>,
    interpreter: &str,
    format: OutputFormat,
) -> Result<()> {
    let code = match (code, file) {
        (Some(code), _) => code,
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read code from stdin")?;
            buf
        }
    };

    let mut repl = LocalRepl::new(interpreter);
    let outcome = repl.execute(&code).await;

    match format {
        OutputFormat::Text => match &outcome {
            ExecOutcome::Output(out) => print!("{}", out),
            ExecOutcome::Failure { .. } => println!("{}", outcome),
        },
        OutputFormat::Json => {
            let output = match &outcome {
                ExecOutcome::Output(out) => json!({
                    "status": "ok",
                    "output": out,
                    "namespace": repl.namespace()
                }),
                ExecOutcome::Failure { kind, message } => json!({
                    "status": "error",
                    "kind": kind.to_string(),
                    "message": message
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
