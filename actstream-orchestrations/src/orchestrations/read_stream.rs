//! Read (refresh) activity stream orchestration

use actstream_models::{status, ActivityStreamRecord, StreamMode};

use crate::activities::describe_db_cluster;
use crate::context::ReconcileContext;
use crate::control_plane::ControlPlaneError;
use crate::error::StreamError;

/// Refresh the record for `id`.
///
/// The record keeps `id` as its identity and arn even when the cluster was
/// matched by its short identifier, so later diffs compare like with like.
///
/// `Ok(None)` means the stream is gone and the record should be dropped:
/// the cluster does not exist, the response does not list it, or its stream
/// is stopped. `apply_immediately` is write-only and always reads as false.
pub async fn read_stream_orchestration(
    ctx: &ReconcileContext,
    id: &str,
) -> Result<Option<ActivityStreamRecord>, StreamError> {
    tracing::debug!(arn = id, "Describing DB cluster");

    let cluster = match describe_db_cluster::find_cluster(ctx.client(), id).await {
        Ok(Some(cluster)) => cluster,
        Ok(None) => {
            tracing::warn!(arn = id, "DB cluster not found, removing activity stream from state");
            return Ok(None);
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!(arn = id, "DB cluster not found, removing activity stream from state");
            return Ok(None);
        }
        Err(e) => return Err(StreamError::remote(describe_db_cluster::NAME, id, e)),
    };

    let stream_status = cluster
        .activity_stream_status
        .as_deref()
        .unwrap_or(status::STOPPED);
    let mode = cluster
        .activity_stream_mode
        .as_deref()
        .filter(|m| !m.is_empty());

    let mode = match mode {
        Some(mode) if stream_status != status::STOPPED => mode,
        _ => {
            tracing::warn!(
                arn = id,
                status = stream_status,
                "Activity stream is not running, removing from state"
            );
            return Ok(None);
        }
    };

    let mode = mode.parse::<StreamMode>().map_err(|e| {
        StreamError::remote(
            describe_db_cluster::NAME,
            id,
            ControlPlaneError::InvalidResponse(e.to_string()),
        )
    })?;

    Ok(Some(ActivityStreamRecord {
        id: id.to_string(),
        resource_arn: id.to_string(),
        apply_immediately: false,
        kms_key_id: cluster.activity_stream_kms_key_id.unwrap_or_default(),
        mode,
        kinesis_stream_name: cluster
            .activity_stream_kinesis_stream_name
            .filter(|s| !s.is_empty()),
    }))
}
