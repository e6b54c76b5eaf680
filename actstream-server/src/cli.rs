use std::path::PathBuf;

use actstream_models::StreamMode;
use clap::{Parser, Subcommand, ValueEnum};

/// actstream - database cluster activity stream lifecycle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Control plane endpoint (overrides ACTSTREAM_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Settings of a stream, shared by create and update
#[derive(clap::Args, Debug, Clone)]
pub struct StreamSettings {
    /// ARN of the database cluster
    #[arg(long)]
    pub arn: String,

    /// KMS key used to encrypt the stream
    #[arg(long)]
    pub kms_key_id: String,

    /// Stream mode ("sync" or "async")
    #[arg(long)]
    pub mode: StreamMode,

    /// Start the stream immediately instead of in the maintenance window
    #[arg(long)]
    pub apply_immediately: bool,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Start an activity stream and wait until it is running
    Create {
        #[command(flatten)]
        settings: StreamSettings,

        /// Give up after this many seconds (overrides ACTSTREAM_CREATE_TIMEOUT_SECS)
        #[arg(long)]
        timeout: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Show the running activity stream of a cluster
    Get {
        /// ARN of the database cluster
        arn: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Replace a running activity stream with new settings
    Update {
        #[command(flatten)]
        settings: StreamSettings,

        /// Whether the running stream was started with --apply-immediately
        #[arg(long)]
        prior_apply_immediately: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Stop an activity stream and wait until it is stopped
    Delete {
        /// ARN of the database cluster
        arn: String,

        /// Give up after this many seconds (overrides ACTSTREAM_DELETE_TIMEOUT_SECS)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Adopt an existing activity stream as a record
    Import {
        /// ARN of the database cluster
        arn: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Converge activity streams to the declarations in a YAML file
    Apply {
        /// YAML file with one stream or a list of streams
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Serve an in-memory control plane for local development
    Sandbox {
        /// API port
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Describe calls a transitional status survives
        #[arg(long, default_value = "2")]
        settle_after: u32,

        /// Seed a cluster by ARN (repeatable)
        #[arg(long = "cluster")]
        clusters: Vec<String>,
    },
}
