//! Stop activity stream activity

use actstream_models::{StopActivityStreamRequest, StopActivityStreamResponse};

use crate::context::ReconcileContext;
use crate::control_plane::ControlPlaneError;

/// Activity name, used in logs and error messages
pub const NAME: &str = "stop-activity-stream";

pub async fn activity(
    ctx: &ReconcileContext,
    input: &StopActivityStreamRequest,
) -> Result<StopActivityStreamResponse, ControlPlaneError> {
    tracing::debug!(activity = NAME, ?input, "Stopping activity stream");

    let output = ctx.client().stop_activity_stream(input.clone()).await?;

    tracing::debug!(activity = NAME, ?output, "Stop activity stream response");
    Ok(output)
}
