//! Import an existing activity stream by cluster ARN

use actstream_models::ActivityStreamRecord;

use crate::context::ReconcileContext;
use crate::error::StreamError;
use crate::orchestrations::read_stream::read_stream_orchestration;

/// Attach a record to a stream that is already running. Every field comes
/// from the live cluster; `apply_immediately` is false.
pub async fn import_stream_orchestration(
    ctx: &ReconcileContext,
    id: &str,
) -> Result<ActivityStreamRecord, StreamError> {
    tracing::info!(arn = id, "Importing activity stream");

    read_stream_orchestration(ctx, id)
        .await?
        .ok_or_else(|| StreamError::Disappeared {
            reason: "cannot import non-existent activity stream",
            resource_arn: id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrations::create_stream::create_stream_orchestration;
    use crate::test_support::{config, context, sandbox_with_cluster, ARN};
    use actstream_models::StreamMode;

    #[tokio::test(start_paused = true)]
    async fn test_import_matches_created_record_except_write_only_flag() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        let mut input = config(StreamMode::Async);
        input.apply_immediately = true;
        let created = create_stream_orchestration(&ctx, input).await.unwrap();

        let imported = import_stream_orchestration(&ctx, ARN).await.unwrap();
        assert_eq!(
            imported,
            ActivityStreamRecord {
                apply_immediately: false,
                ..created
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_of_missing_stream_fails() {
        let sandbox = sandbox_with_cluster(1);
        let ctx = context(&sandbox);

        let err = import_stream_orchestration(&ctx, ARN).await.unwrap_err();
        assert!(matches!(err, StreamError::Disappeared { .. }));
        assert_eq!(
            err.to_string(),
            format!("cannot import non-existent activity stream: {}", ARN)
        );
    }
}
