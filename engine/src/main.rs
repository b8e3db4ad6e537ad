// RLM Engine
// Main entry point for the rlm binary

use clap::Parser;
use rlm_engine::cli::{Cli, Command};
use rlm_engine::config::Config;
use rlm_engine::handlers::{handle_context, handle_exec, handle_run, handle_smart, OutputFormat};
use rlm_engine::telemetry::init_telemetry_with_level;
use sdk::errors::{EngineError, RlmErrorExt};
use std::process::ExitCode;

/// Exit status for any unhandled fault
const EXIT_FAILURE: u8 = 1;

/// Exit status after Ctrl-C, as shells report SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{:#}", e);
                eprintln!("[ERROR] {:#}", e);
                if let Some(engine_error) = e.downcast_ref::<EngineError>() {
                    eprintln!("Hint: {}", engine_error.user_hint());
                }
                ExitCode::from(EXIT_FAILURE)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n[!] {}", EngineError::Interrupted);
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // RUST_LOG still wins over both
    init_telemetry_with_level(cli.log_level().unwrap_or(&config.core.log_level));

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");
    tracing::debug!("RLM Engine v{} ({} - {})", version, commit, timestamp);

    match cli.command {
        Command::Run { args } => handle_run(args, &config, format).await,

        Command::Smart { args, confidence } => {
            handle_smart(args, confidence, &config, format).await
        }

        Command::Context { action } => {
            tracing::debug!("Context management: {:?}", action);
            handle_context(action, &config, format).await
        }

        Command::Exec {
            code,
            file,
            interpreter,
        } => handle_exec(code, file.as_deref(), &interpreter, format).await,
    }
}
