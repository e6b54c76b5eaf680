use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use actstream_models::{ActivityStreamConfig, ActivityStreamRecord, ReplacementField};
use actstream_orchestrations::{
    ActivityStreamReconciler, ApplyOutcome, HttpControlPlane, PollSettings, Timeouts,
    UpdateOutcome,
};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::{OutputFormat, StreamSettings};
use crate::config::Config;

/// Per-command overrides of the configured timeouts, in seconds
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeoutOverrides {
    pub create: Option<u64>,
    pub delete: Option<u64>,
}

fn build_reconciler(config: &Config, overrides: TimeoutOverrides) -> Result<ActivityStreamReconciler> {
    let client = HttpControlPlane::new(
        config.endpoint.clone(),
        config.api_token.clone(),
        config.request_timeout,
    )
    .context("Failed to create control plane client")?;

    tracing::debug!(endpoint = client.endpoint(), "Using control plane");

    let timeouts = Timeouts {
        create: overrides
            .create
            .map(Duration::from_secs)
            .unwrap_or(config.create_timeout),
        delete: overrides
            .delete
            .map(Duration::from_secs)
            .unwrap_or(config.delete_timeout),
    };

    Ok(ActivityStreamReconciler::new(Arc::new(client))
        .with_timeouts(timeouts)
        .with_polling(PollSettings::with_interval(config.poll_interval)))
}

impl From<StreamSettings> for ActivityStreamConfig {
    fn from(settings: StreamSettings) -> Self {
        Self {
            resource_arn: settings.arn,
            apply_immediately: settings.apply_immediately,
            kms_key_id: settings.kms_key_id,
            mode: settings.mode,
        }
    }
}

pub async fn run_create(
    config: &Config,
    settings: StreamSettings,
    timeout: Option<u64>,
    output: OutputFormat,
) -> Result<()> {
    let reconciler = build_reconciler(config, TimeoutOverrides { create: timeout, delete: None })?;
    let arn = settings.arn.clone();

    eprintln!("Starting activity stream on '{}'...", arn);
    let record = reconciler
        .create(settings.into())
        .await
        .with_context(|| format!("Failed to create activity stream for '{}'", arn))?;

    print_record(&record, output)
}

pub async fn run_get(config: &Config, arn: String, output: OutputFormat) -> Result<()> {
    let reconciler = build_reconciler(config, TimeoutOverrides::default())?;

    let record = reconciler
        .read(&arn)
        .await
        .with_context(|| format!("Failed to read activity stream for '{}'", arn))?;

    match record {
        Some(record) => print_record(&record, output),
        None => anyhow::bail!("No running activity stream on '{}'", arn),
    }
}

pub async fn run_update(
    config: &Config,
    settings: StreamSettings,
    prior_apply_immediately: bool,
    output: OutputFormat,
) -> Result<()> {
    let reconciler = build_reconciler(config, TimeoutOverrides::default())?;
    let arn = settings.arn.clone();

    let prior = reconciler
        .read(&arn)
        .await
        .with_context(|| format!("Failed to read activity stream for '{}'", arn))?
        .with_context(|| format!("No running activity stream on '{}', use create", arn))?;
    let prior = ActivityStreamRecord {
        apply_immediately: prior_apply_immediately,
        ..prior
    };

    let outcome = reconciler
        .update(&prior, settings.into())
        .await
        .with_context(|| format!("Failed to update activity stream for '{}'", arn))?;

    match outcome {
        UpdateOutcome::Unchanged { record } => {
            eprintln!("No changes");
            print_record(&record, output)
        }
        UpdateOutcome::Replaced { record, changes } => {
            eprintln!("Replaced ({})", join_changes(&changes));
            print_record(&record, output)
        }
        UpdateOutcome::Gone => anyhow::bail!("Activity stream on '{}' disappeared", arn),
    }
}

pub async fn run_delete(config: &Config, arn: String, timeout: Option<u64>) -> Result<()> {
    let reconciler = build_reconciler(config, TimeoutOverrides { create: None, delete: timeout })?;

    eprintln!("Stopping activity stream on '{}'...", arn);
    reconciler
        .delete(&arn)
        .await
        .with_context(|| format!("Failed to delete activity stream for '{}'", arn))?;

    println!("✓ Activity stream on '{}' stopped", arn);
    Ok(())
}

pub async fn run_import(config: &Config, arn: String, output: OutputFormat) -> Result<()> {
    let reconciler = build_reconciler(config, TimeoutOverrides::default())?;

    let record = reconciler
        .import(&arn)
        .await
        .with_context(|| format!("Failed to import activity stream for '{}'", arn))?;

    print_record(&record, output)
}

pub async fn run_apply(config: &Config, file: &Path, output: OutputFormat) -> Result<()> {
    let declarations = load_declarations(file)?;
    let reconciler = build_reconciler(config, TimeoutOverrides::default())?;

    let mut outcomes = Vec::with_capacity(declarations.len());
    for desired in declarations {
        let arn = desired.resource_arn.clone();
        let outcome = reconciler
            .apply(desired)
            .await
            .with_context(|| format!("Failed to apply activity stream for '{}'", arn))?;
        outcomes.push(outcome);
    }

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Table => {
            println!("{:<60} {:<10} {:<6} {}", "ARN", "ACTION", "MODE", "STREAM");
            println!("{}", "-".repeat(110));
            for outcome in &outcomes {
                let action = match outcome {
                    ApplyOutcome::Created { .. } => "created",
                    ApplyOutcome::Replaced { .. } => "replaced",
                    ApplyOutcome::Unchanged { .. } => "unchanged",
                };
                let record = outcome.record();
                println!(
                    "{:<60} {:<10} {:<6} {}",
                    record.resource_arn,
                    action,
                    record.mode,
                    record.kinesis_stream_name.as_deref().unwrap_or("-")
                );
            }
            println!();
            println!("{} stream(s) applied", outcomes.len());
        }
    }

    Ok(())
}

/// A declaration file holds either one stream or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Declarations {
    One(ActivityStreamConfig),
    Many(Vec<ActivityStreamConfig>),
}

fn load_declarations(file: &Path) -> Result<Vec<ActivityStreamConfig>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    parse_declarations(&content).with_context(|| format!("Invalid declarations in {}", file.display()))
}

fn parse_declarations(content: &str) -> Result<Vec<ActivityStreamConfig>> {
    let declarations = match serde_yaml::from_str::<Declarations>(content)? {
        Declarations::One(config) => vec![config],
        Declarations::Many(configs) => configs,
    };

    for config in &declarations {
        config.validate()?;
    }
    Ok(declarations)
}

fn join_changes(changes: &[ReplacementField]) -> String {
    changes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_record(record: &ActivityStreamRecord, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Table => {
            println!("Activity stream: {}", record.id);
            println!("{}", "=".repeat(60));
            println!("  Mode:              {}", record.mode);
            println!("  KMS key:           {}", record.kms_key_id);
            println!(
                "  Kinesis stream:    {}",
                record.kinesis_stream_name.as_deref().unwrap_or("-")
            );
            println!("  Apply immediately: {}", record.apply_immediately);
        }
    }
    Ok(())
}
