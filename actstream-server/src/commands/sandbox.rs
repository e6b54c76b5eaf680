use std::sync::Arc;

use actstream_orchestrations::SandboxControlPlane;
use anyhow::Result;

use crate::api::{self, AppState};

pub async fn run_sandbox(port: u16, settle_after: u32, clusters: Vec<String>) -> Result<()> {
    tracing::info!("Starting sandbox control plane");
    tracing::info!("Transitional statuses settle after {} describe call(s)", settle_after);

    let control_plane = Arc::new(SandboxControlPlane::with_settle_after(settle_after));
    for arn in &clusters {
        control_plane.add_cluster(arn);
        tracing::info!(arn = %arn, "Seeded DB cluster");
    }

    api::start_server(port, AppState { control_plane }).await
}
