//! Converge the live activity stream on a declared configuration

use actstream_models::ActivityStreamConfig;

use crate::context::ReconcileContext;
use crate::error::StreamError;
use crate::orchestrations::create_stream::create_stream_orchestration;
use crate::orchestrations::read_stream::read_stream_orchestration;
use crate::orchestrations::update_stream::replace_stream;
use crate::types::ApplyOutcome;

/// Create the stream when it is missing, replace it when the key or mode
/// differ, otherwise leave it alone. `apply_immediately` cannot be observed
/// remotely and is never compared.
pub async fn apply_stream_orchestration(
    ctx: &ReconcileContext,
    desired: ActivityStreamConfig,
) -> Result<ApplyOutcome, StreamError> {
    desired.validate()?;

    let Some(mut current) = read_stream_orchestration(ctx, &desired.resource_arn).await? else {
        tracing::info!(arn = %desired.resource_arn, "Activity stream missing, creating");
        let record = create_stream_orchestration(ctx, desired).await?;
        return Ok(ApplyOutcome::Created { record });
    };

    current.apply_immediately = desired.apply_immediately;
    let changes = desired.replacement_changes(&current.config());
    if changes.is_empty() {
        tracing::info!(arn = %current.id, "Activity stream up to date");
        return Ok(ApplyOutcome::Unchanged { record: current });
    }

    let record = replace_stream(ctx, &current.id, desired).await?;
    Ok(ApplyOutcome::Replaced { record, changes })
}
