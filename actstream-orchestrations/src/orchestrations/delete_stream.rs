//! Delete (stop) activity stream orchestration

use actstream_models::{status, StopActivityStreamRequest};

use crate::activities::{describe_db_cluster, stop_activity_stream};
use crate::context::ReconcileContext;
use crate::error::StreamError;
use crate::waiter::StateWaiter;

/// Stop the stream and wait until it is stopped. Teardown always applies
/// immediately. A cluster that no longer exists counts as already stopped.
pub async fn delete_stream_orchestration(
    ctx: &ReconcileContext,
    id: &str,
) -> Result<(), StreamError> {
    tracing::info!(arn = id, "Stopping activity stream");

    let input = StopActivityStreamRequest {
        resource_arn: id.to_string(),
        apply_immediately: true,
    };

    match stop_activity_stream::activity(ctx, &input).await {
        Ok(output) => {
            tracing::debug!(arn = id, status = ?output.status, "Activity stream stop accepted");
        }
        Err(e) if e.is_not_found() => {
            tracing::info!(arn = id, "DB cluster not found, activity stream already gone");
            return Ok(());
        }
        Err(e) => return Err(StreamError::remote(stop_activity_stream::NAME, id, e)),
    }

    let client = ctx.client();
    StateWaiter::new(&[status::STOPPING], &[status::STOPPED], ctx.timeouts.delete)
        .with_polling(&ctx.polling)
        .wait_for_status(id, move || describe_db_cluster::activity_stream_status(client, id))
        .await?;

    tracing::info!(arn = id, "Activity stream stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::ControlPlane;
    use crate::orchestrations::create_stream::create_stream_orchestration;
    use crate::orchestrations::read_stream::read_stream_orchestration;
    use crate::sandbox::ControlPlaneCall;
    use crate::test_support::{config, context, sandbox_with_cluster, ARN};
    use actstream_models::{StartActivityStreamRequest, StreamMode};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_delete_stops_immediately_and_waits() {
        let sandbox = sandbox_with_cluster(2);
        let ctx = context(&sandbox);

        // stored flag is false, teardown still applies immediately
        create_stream_orchestration(&ctx, config(StreamMode::Async)).await.unwrap();
        delete_stream_orchestration(&ctx, ARN).await.unwrap();

        assert_eq!(sandbox.stream_status(ARN).as_deref(), Some(status::STOPPED));
        assert_eq!(
            sandbox.calls().last(),
            Some(&ControlPlaneCall::Stop(StopActivityStreamRequest {
                resource_arn: ARN.to_string(),
                apply_immediately: true,
            }))
        );
        assert_eq!(read_stream_orchestration(&ctx, ARN).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_twice_is_idempotent() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        create_stream_orchestration(&ctx, config(StreamMode::Sync)).await.unwrap();
        delete_stream_orchestration(&ctx, ARN).await.unwrap();
        delete_stream_orchestration(&ctx, ARN).await.unwrap();

        assert_eq!(sandbox.stream_status(ARN).as_deref(), Some(status::STOPPED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_with_unbounded_timeout() {
        let sandbox = sandbox_with_cluster(1);
        let mut ctx = context(&sandbox);
        ctx.timeouts.delete = Duration::from_secs(u64::MAX);

        create_stream_orchestration(&ctx, config(StreamMode::Sync)).await.unwrap();
        delete_stream_orchestration(&ctx, ARN).await.unwrap();

        assert_eq!(sandbox.stream_status(ARN).as_deref(), Some(status::STOPPED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_after_cluster_disappeared() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        create_stream_orchestration(&ctx, config(StreamMode::Sync)).await.unwrap();
        sandbox.remove_cluster(ARN);

        delete_stream_orchestration(&ctx, ARN).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cluster_removed_while_stopping_counts_as_stopped() {
        let sandbox = sandbox_with_cluster(u32::MAX);
        let ctx = context(&sandbox);

        let input = StopActivityStreamRequest {
            resource_arn: ARN.to_string(),
            apply_immediately: true,
        };
        // put the stream into a never-ending "stopping"
        sandbox
            .start_activity_stream(StartActivityStreamRequest {
                resource_arn: ARN.to_string(),
                kms_key_id: "key-1".to_string(),
                mode: StreamMode::Sync,
                apply_immediately: true,
            })
            .await
            .unwrap();
        stop_activity_stream::activity(&ctx, &input).await.unwrap();
        assert_eq!(sandbox.stream_status(ARN).as_deref(), Some(status::STOPPING));

        sandbox.remove_cluster(ARN);
        let client = ctx.client();
        let observed = StateWaiter::new(&[status::STOPPING], &[status::STOPPED], ctx.timeouts.delete)
            .with_polling(&ctx.polling)
            .wait_for_status(ARN, move || describe_db_cluster::activity_stream_status(client, ARN))
            .await
            .unwrap();
        assert_eq!(observed, status::STOPPED);
    }
}
