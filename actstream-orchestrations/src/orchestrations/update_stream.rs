//! Update activity stream orchestration
//!
//! A running stream cannot be modified, so every change is a full stop
//! followed by a full start, each awaited to completion.

use actstream_models::{ActivityStreamConfig, ActivityStreamRecord};

use crate::context::ReconcileContext;
use crate::error::StreamError;
use crate::orchestrations::create_stream::create_stream_orchestration;
use crate::orchestrations::delete_stream::delete_stream_orchestration;
use crate::orchestrations::read_stream::read_stream_orchestration;
use crate::types::{UpdateOutcome, UpdatePhase};

pub async fn update_stream_orchestration(
    ctx: &ReconcileContext,
    prior: &ActivityStreamRecord,
    desired: ActivityStreamConfig,
) -> Result<UpdateOutcome, StreamError> {
    desired.validate()?;

    let changes = desired.replacement_changes(&prior.config());
    if changes.is_empty() {
        tracing::debug!(arn = %prior.id, "No activity stream changes");
        return match read_stream_orchestration(ctx, &prior.id).await? {
            Some(record) => Ok(UpdateOutcome::Unchanged {
                record: ActivityStreamRecord {
                    apply_immediately: prior.apply_immediately,
                    ..record
                },
            }),
            None => Ok(UpdateOutcome::Gone),
        };
    }

    let changed = changes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!(arn = %prior.id, %changed, "Replacing activity stream");

    let record = replace_stream(ctx, &prior.id, desired).await?;
    Ok(UpdateOutcome::Replaced { record, changes })
}

/// Stop the stream identified by `prior_id`, then start it with `desired`
pub(crate) async fn replace_stream(
    ctx: &ReconcileContext,
    prior_id: &str,
    desired: ActivityStreamConfig,
) -> Result<ActivityStreamRecord, StreamError> {
    tracing::debug!(arn = prior_id, "Stopping activity stream before updating");
    delete_stream_orchestration(ctx, prior_id)
        .await
        .map_err(|e| StreamError::Update {
            phase: UpdatePhase::Teardown,
            resource_arn: prior_id.to_string(),
            source: Box::new(e),
        })?;

    tracing::debug!(arn = %desired.resource_arn, "Starting activity stream with new configuration");
    let resource_arn = desired.resource_arn.clone();
    create_stream_orchestration(ctx, desired)
        .await
        .map_err(|e| StreamError::Update {
            phase: UpdatePhase::Restart,
            resource_arn,
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::context::ReconcileContext;
    use crate::control_plane::{ControlPlane, ControlPlaneError};
    use crate::sandbox::{ControlPlaneCall, SandboxControlPlane};
    use crate::test_support::{config, context, sandbox_with_cluster, ARN};
    use actstream_models::{
        status, DescribeDbClustersRequest, DescribeDbClustersResponse, ReplacementField,
        StartActivityStreamRequest, StartActivityStreamResponse, StopActivityStreamRequest,
        StopActivityStreamResponse, StreamMode,
    };
    use async_trait::async_trait;

    /// Sandbox whose stop calls are refused
    struct StopRefused(Arc<SandboxControlPlane>);

    #[async_trait]
    impl ControlPlane for StopRefused {
        async fn start_activity_stream(
            &self,
            request: StartActivityStreamRequest,
        ) -> Result<StartActivityStreamResponse, ControlPlaneError> {
            self.0.start_activity_stream(request).await
        }

        async fn stop_activity_stream(
            &self,
            _request: StopActivityStreamRequest,
        ) -> Result<StopActivityStreamResponse, ControlPlaneError> {
            Err(ControlPlaneError::Api {
                status: 403,
                code: "AccessDenied".to_string(),
                message: "not authorized to stop activity streams".to_string(),
            })
        }

        async fn describe_db_clusters(
            &self,
            request: DescribeDbClustersRequest,
        ) -> Result<DescribeDbClustersResponse, ControlPlaneError> {
            self.0.describe_db_clusters(request).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_change_stops_then_starts() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        let prior = create_stream_orchestration(&ctx, config(StreamMode::Sync))
            .await
            .unwrap();

        let outcome = update_stream_orchestration(&ctx, &prior, config(StreamMode::Async))
            .await
            .unwrap();

        let (record, changes) = match outcome {
            UpdateOutcome::Replaced { record, changes } => (record, changes),
            other => panic!("expected replacement, got {:?}", other),
        };
        assert_eq!(changes, vec![ReplacementField::Mode]);
        assert_eq!(record.mode, StreamMode::Async);
        // the stream name is derived from the cluster, so it survives the restart
        assert!(record.kinesis_stream_name.is_some());
        assert_eq!(record.kinesis_stream_name, prior.kinesis_stream_name);
        assert_eq!(sandbox.stream_status(ARN).as_deref(), Some(status::STARTED));

        let calls = sandbox.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[1], ControlPlaneCall::Stop(_)));
        assert!(matches!(
            &calls[2],
            ControlPlaneCall::Start(request) if request.mode == StreamMode::Async
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_immediately_change_forces_replacement() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        let prior = create_stream_orchestration(&ctx, config(StreamMode::Sync))
            .await
            .unwrap();

        let mut desired = config(StreamMode::Sync);
        desired.apply_immediately = true;
        let outcome = update_stream_orchestration(&ctx, &prior, desired).await.unwrap();

        assert!(matches!(
            outcome,
            UpdateOutcome::Replaced { ref record, .. } if record.apply_immediately
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_change_only_refreshes() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        let prior = create_stream_orchestration(&ctx, config(StreamMode::Async))
            .await
            .unwrap();
        let outcome = update_stream_orchestration(&ctx, &prior, prior.config())
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Unchanged { record: prior.clone() });
        assert_eq!(sandbox.calls().len(), 1);

        sandbox.remove_cluster(ARN);
        let gone = update_stream_orchestration(&ctx, &prior, prior.config())
            .await
            .unwrap();
        assert_eq!(gone, UpdateOutcome::Gone);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_failure_reports_phase() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        let prior = create_stream_orchestration(&ctx, config(StreamMode::Sync))
            .await
            .unwrap();

        let mut desired = config(StreamMode::Sync);
        desired.resource_arn = "arn:aws:rds:us-east-1:000000000000:cluster:missing".to_string();

        let err = update_stream_orchestration(&ctx, &prior, desired)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StreamError::Update {
                phase: UpdatePhase::Restart,
                ..
            }
        ));
        // the old stream stays torn down
        assert_eq!(sandbox.stream_status(ARN).as_deref(), Some(status::STOPPED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_failure_reports_phase() {
        let sandbox = sandbox_with_cluster(1);
        let prior = create_stream_orchestration(&context(&sandbox), config(StreamMode::Sync))
            .await
            .unwrap();

        let ctx = ReconcileContext::new(Arc::new(StopRefused(sandbox.clone())));
        let err = update_stream_orchestration(&ctx, &prior, config(StreamMode::Async))
            .await
            .unwrap_err();

        match err {
            StreamError::Update {
                phase: UpdatePhase::Teardown,
                source,
                ..
            } => assert!(matches!(
                *source,
                StreamError::RemoteCall {
                    source: ControlPlaneError::Api { status: 403, .. },
                    ..
                }
            )),
            other => panic!("expected teardown failure, got {:?}", other),
        }
        // nothing was restarted
        assert_eq!(sandbox.calls().len(), 1);
        assert_eq!(sandbox.stream_status(ARN).as_deref(), Some(status::STARTED));
    }
}
