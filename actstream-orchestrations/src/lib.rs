//! actstream orchestrations - lifecycle of a database cluster activity stream
//!
//! Activities are single control plane calls; orchestrations chain them with
//! the [`waiter::StateWaiter`] poll loop into create, read, update and delete.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use actstream_models::{ActivityStreamConfig, StreamMode};
//! use actstream_orchestrations::{ActivityStreamReconciler, HttpControlPlane};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpControlPlane::new("http://localhost:8080", None, Duration::from_secs(30))?;
//! let reconciler = ActivityStreamReconciler::new(Arc::new(client));
//!
//! let record = reconciler
//!     .create(ActivityStreamConfig {
//!         resource_arn: "arn:aws:rds:us-east-1:123456789012:cluster:db-1".to_string(),
//!         apply_immediately: true,
//!         kms_key_id: "key-1".to_string(),
//!         mode: StreamMode::Async,
//!     })
//!     .await?;
//! println!("stream: {:?}", record.kinesis_stream_name);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod control_plane;
pub mod error;
pub mod http_client;
pub mod reconciler;
pub mod sandbox;
pub mod types;
pub mod waiter;

mod activities;
mod orchestrations;

pub use context::{ReconcileContext, Timeouts};
pub use control_plane::{ControlPlane, ControlPlaneError};
pub use error::StreamError;
pub use http_client::HttpControlPlane;
pub use reconciler::ActivityStreamReconciler;
pub use sandbox::SandboxControlPlane;
pub use types::*;
pub use waiter::{PollSettings, StateWaiter, WaitError};
