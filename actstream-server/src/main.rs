use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod commands;
mod config;

use cli::{Args, Mode};
use commands::stream;
use config::Config;

/// Initialize tracing:
/// 1. Console output (stderr), so command output on stdout stays clean
/// 2. File output (`$ACTSTREAM_LOG_DIR/actstream.log`) when the variable is set
///
/// The returned guard flushes the file writer and must live until exit.
fn initialize_tracing() -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,\
         actstream_server=debug,\
         actstream_orchestrations=debug"
            .into()
    });

    let console_layer = fmt::layer().with_writer(std::io::stderr);

    let log_dir = std::env::var("ACTSTREAM_LOG_DIR")
        .ok()
        .filter(|d| !d.is_empty())
        .map(PathBuf::from);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let file_appender = tracing_appender::rolling::never(&dir, "actstream.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(file_writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let _guard = initialize_tracing()?;

    let mut config = Config::load()?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    match args.mode {
        Mode::Create { settings, timeout, output } => {
            stream::run_create(&config, settings, timeout, output).await
        }
        Mode::Get { arn, output } => stream::run_get(&config, arn, output).await,
        Mode::Update { settings, prior_apply_immediately, output } => {
            stream::run_update(&config, settings, prior_apply_immediately, output).await
        }
        Mode::Delete { arn, timeout } => stream::run_delete(&config, arn, timeout).await,
        Mode::Import { arn, output } => stream::run_import(&config, arn, output).await,
        Mode::Apply { file, output } => stream::run_apply(&config, &file, output).await,
        Mode::Sandbox { port, settle_after, clusters } => {
            commands::sandbox::run_sandbox(port, settle_after, clusters).await
        }
    }
}
