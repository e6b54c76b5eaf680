//! Start activity stream activity

use actstream_models::{StartActivityStreamRequest, StartActivityStreamResponse};

use crate::context::ReconcileContext;
use crate::control_plane::ControlPlaneError;

/// Activity name, used in logs and error messages
pub const NAME: &str = "start-activity-stream";

pub async fn activity(
    ctx: &ReconcileContext,
    input: &StartActivityStreamRequest,
) -> Result<StartActivityStreamResponse, ControlPlaneError> {
    tracing::debug!(activity = NAME, ?input, "Starting activity stream");

    let output = ctx.client().start_activity_stream(input.clone()).await?;

    tracing::debug!(activity = NAME, ?output, "Start activity stream response");
    Ok(output)
}
