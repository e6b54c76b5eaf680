//! Describe DB cluster activity and the activity stream status refresh built on it

use actstream_models::{status, DbCluster, DescribeDbClustersRequest};

use crate::control_plane::{ControlPlane, ControlPlaneError};

/// Activity name, used in logs and error messages
pub const NAME: &str = "describe-db-clusters";

/// Cluster whose ARN or identifier matches, `None` if the response lists no such cluster.
///
/// Not-found faults are passed through so callers decide what absence means.
pub async fn find_cluster(
    client: &dyn ControlPlane,
    identifier: &str,
) -> Result<Option<DbCluster>, ControlPlaneError> {
    let output = client
        .describe_db_clusters(DescribeDbClustersRequest {
            db_cluster_identifier: identifier.to_string(),
        })
        .await?;

    Ok(output
        .db_clusters
        .into_iter()
        .find(|c| c.db_cluster_arn == identifier || c.db_cluster_identifier == identifier))
}

/// Current activity stream status of a cluster.
///
/// A missing cluster reads as `stopped`, so waiting for a teardown succeeds
/// even when the cluster itself has been deleted.
pub async fn activity_stream_status(
    client: &dyn ControlPlane,
    identifier: &str,
) -> Result<String, ControlPlaneError> {
    match find_cluster(client, identifier).await {
        Ok(Some(cluster)) => Ok(cluster
            .activity_stream_status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| status::STOPPED.to_string())),
        Ok(None) => {
            tracing::debug!(activity = NAME, identifier, "Cluster missing from describe response");
            Ok(status::STOPPED.to_string())
        }
        Err(e) if e.is_not_found() => {
            tracing::debug!(activity = NAME, identifier, "Cluster not found, treating stream as stopped");
            Ok(status::STOPPED.to_string())
        }
        Err(e) => Err(e),
    }
}
