//! Create (start) activity stream orchestration

use actstream_models::{
    status, ActivityStreamConfig, ActivityStreamRecord, StartActivityStreamRequest,
    StartActivityStreamResponse,
};
use tokio::time::{sleep, Instant};

use crate::activities::{describe_db_cluster, start_activity_stream};
use crate::context::ReconcileContext;
use crate::error::StreamError;
use crate::orchestrations::read_stream::read_stream_orchestration;
use crate::waiter::{deadline_after, StateWaiter};

pub async fn create_stream_orchestration(
    ctx: &ReconcileContext,
    input: ActivityStreamConfig,
) -> Result<ActivityStreamRecord, StreamError> {
    input.validate()?;

    tracing::info!(
        arn = %input.resource_arn,
        mode = %input.mode,
        apply_immediately = input.apply_immediately,
        "Starting activity stream"
    );

    let request = StartActivityStreamRequest {
        resource_arn: input.resource_arn.clone(),
        kms_key_id: input.kms_key_id.clone(),
        mode: input.mode,
        apply_immediately: input.apply_immediately,
    };

    let response = start_with_retry(ctx, &request).await?;
    tracing::info!(
        arn = %input.resource_arn,
        status = ?response.status,
        stream = ?response.kinesis_stream_name,
        "Activity stream start accepted"
    );

    // The ARN is the record identity from here on
    let id = input.resource_arn.clone();

    wait_for_started(ctx, &id).await?;

    let record = read_stream_orchestration(ctx, &id)
        .await?
        .ok_or_else(|| StreamError::Disappeared {
            reason: "activity stream disappeared after create",
            resource_arn: id.clone(),
        })?;

    Ok(ActivityStreamRecord {
        apply_immediately: input.apply_immediately,
        ..record
    })
}

/// Start the stream, retrying while the cluster is not ready for activity
/// streams. The last attempt happens at the create deadline.
async fn start_with_retry(
    ctx: &ReconcileContext,
    request: &StartActivityStreamRequest,
) -> Result<StartActivityStreamResponse, StreamError> {
    let deadline = deadline_after(Instant::now(), ctx.timeouts.create);
    let mut attempt: u32 = 1;

    loop {
        match start_activity_stream::activity(ctx, request).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_unsupported_configuration() => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::warn!(
                        arn = %request.resource_arn,
                        attempt,
                        "Cluster still not ready for activity streams, giving up"
                    );
                    return Err(StreamError::remote(
                        start_activity_stream::NAME,
                        &request.resource_arn,
                        e,
                    ));
                }

                tracing::debug!(
                    arn = %request.resource_arn,
                    attempt,
                    error = %e,
                    "Cluster not ready for activity streams, retrying"
                );
                sleep(ctx.polling.retry_interval.min(deadline - now)).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(StreamError::remote(
                    start_activity_stream::NAME,
                    &request.resource_arn,
                    e,
                ))
            }
        }
    }
}

async fn wait_for_started(ctx: &ReconcileContext, id: &str) -> Result<String, StreamError> {
    let client = ctx.client();
    let observed = StateWaiter::new(&[status::STARTING], &[status::STARTED], ctx.timeouts.create)
        .with_polling(&ctx.polling)
        .wait_for_status(id, move || describe_db_cluster::activity_stream_status(client, id))
        .await?;
    Ok(observed)
}
