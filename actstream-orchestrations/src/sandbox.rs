//! In-memory control plane for local development and tests
//!
//! Clusters live in a map keyed by ARN. Starting or stopping a stream puts it
//! in a transitional status that settles after a configurable number of
//! describe calls, which mimics the eventual consistency of the real service.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use actstream_models::{
    error_codes, status, DbCluster, DescribeDbClustersRequest, DescribeDbClustersResponse,
    StartActivityStreamRequest, StartActivityStreamResponse, StopActivityStreamRequest,
    StopActivityStreamResponse, StreamMode, ACTIVITY_STREAMS_NOT_SUPPORTED,
};
use async_trait::async_trait;
use uuid::Uuid;

use crate::control_plane::{ControlPlane, ControlPlaneError};

/// Mutating call received by the sandbox, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneCall {
    Start(StartActivityStreamRequest),
    Stop(StopActivityStreamRequest),
}

#[derive(Debug)]
struct SandboxCluster {
    identifier: String,
    arn: String,
    resource_id: String,
    status: String,
    mode: Option<StreamMode>,
    kms_key_id: Option<String>,
    kinesis_stream_name: Option<String>,
    observations_left: u32,
}

impl SandboxCluster {
    fn matches(&self, identifier: &str) -> bool {
        self.arn == identifier || self.identifier == identifier
    }

    /// Advance a transitional status once its observation budget is spent
    fn observe(&mut self) {
        if self.status != status::STARTING && self.status != status::STOPPING {
            return;
        }
        if self.observations_left > 0 {
            self.observations_left -= 1;
            return;
        }
        if self.status == status::STARTING {
            self.status = status::STARTED.to_string();
        } else {
            self.settle_stopped();
        }
    }

    fn settle_stopped(&mut self) {
        self.status = status::STOPPED.to_string();
        self.mode = None;
        self.kms_key_id = None;
        self.kinesis_stream_name = None;
    }

    fn describe(&self) -> DbCluster {
        DbCluster {
            db_cluster_identifier: self.identifier.clone(),
            db_cluster_arn: self.arn.clone(),
            activity_stream_status: Some(self.status.clone()),
            activity_stream_mode: self.mode.map(|m| m.to_string()),
            activity_stream_kms_key_id: self.kms_key_id.clone(),
            activity_stream_kinesis_stream_name: self.kinesis_stream_name.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct SandboxState {
    clusters: BTreeMap<String, SandboxCluster>,
    unsupported_starts: u32,
    calls: Vec<ControlPlaneCall>,
}

impl SandboxState {
    fn cluster_mut(&mut self, identifier: &str) -> Result<&mut SandboxCluster, ControlPlaneError> {
        self.clusters
            .values_mut()
            .find(|c| c.matches(identifier))
            .ok_or_else(|| ControlPlaneError::not_found(format!("DBCluster {} not found.", identifier)))
    }
}

#[derive(Debug)]
pub struct SandboxControlPlane {
    state: Mutex<SandboxState>,
    settle_after: u32,
}

impl Default for SandboxControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxControlPlane {
    pub fn new() -> Self {
        Self::with_settle_after(1)
    }

    /// `settle_after` describe calls still report `starting`/`stopping`
    /// before the stream settles
    pub fn with_settle_after(settle_after: u32) -> Self {
        Self {
            state: Mutex::new(SandboxState::default()),
            settle_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SandboxState> {
        // A panicking test must not poison every later assertion
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a cluster without an activity stream. The identifier is the
    /// last `:`-separated segment of the ARN.
    pub fn add_cluster(&self, arn: &str) {
        let identifier = arn.rsplit(':').next().unwrap_or(arn).to_string();
        let resource_id = format!("cluster-{}", Uuid::new_v4().simple().to_string().to_uppercase());

        tracing::debug!(%arn, %resource_id, "Sandbox cluster added");
        self.lock().clusters.insert(
            arn.to_string(),
            SandboxCluster {
                identifier,
                arn: arn.to_string(),
                resource_id,
                status: status::STOPPED.to_string(),
                mode: None,
                kms_key_id: None,
                kinesis_stream_name: None,
                observations_left: 0,
            },
        );
    }

    /// Delete a cluster out of band. Returns whether it existed.
    pub fn remove_cluster(&self, identifier: &str) -> bool {
        let mut state = self.lock();
        let before = state.clusters.len();
        state.clusters.retain(|_, c| !c.matches(identifier));
        state.clusters.len() != before
    }

    /// Reject the next `count` start calls as "not supported for this configuration"
    pub fn reject_starts_as_unsupported(&self, count: u32) {
        self.lock().unsupported_starts = count;
    }

    pub fn calls(&self) -> Vec<ControlPlaneCall> {
        self.lock().calls.clone()
    }

    /// Current stream status without counting as an observation
    pub fn stream_status(&self, identifier: &str) -> Option<String> {
        self.lock()
            .clusters
            .values()
            .find(|c| c.matches(identifier))
            .map(|c| c.status.clone())
    }
}

#[async_trait]
impl ControlPlane for SandboxControlPlane {
    async fn start_activity_stream(
        &self,
        request: StartActivityStreamRequest,
    ) -> Result<StartActivityStreamResponse, ControlPlaneError> {
        let settle_after = self.settle_after;
        let mut state = self.lock();
        state.calls.push(ControlPlaneCall::Start(request.clone()));

        if state.unsupported_starts > 0 {
            state.unsupported_starts -= 1;
            return Err(ControlPlaneError::InvalidParameterCombination {
                message: format!("{}.", ACTIVITY_STREAMS_NOT_SUPPORTED),
            });
        }

        let cluster = state.cluster_mut(&request.resource_arn)?;
        if cluster.status != status::STOPPED {
            return Err(ControlPlaneError::Api {
                status: 400,
                code: error_codes::INVALID_DB_CLUSTER_STATE.to_string(),
                message: format!(
                    "Activity stream of DBCluster {} is {}",
                    cluster.identifier, cluster.status
                ),
            });
        }

        cluster.mode = Some(request.mode);
        cluster.kms_key_id = Some(request.kms_key_id.clone());
        cluster.kinesis_stream_name = Some(format!("aws-rds-das-{}", cluster.resource_id));
        if settle_after == 0 {
            cluster.status = status::STARTED.to_string();
        } else {
            cluster.status = status::STARTING.to_string();
            cluster.observations_left = settle_after;
        }

        Ok(StartActivityStreamResponse {
            kms_key_id: cluster.kms_key_id.clone(),
            kinesis_stream_name: cluster.kinesis_stream_name.clone(),
            status: Some(cluster.status.clone()),
            mode: cluster.mode,
            apply_immediately: Some(request.apply_immediately),
        })
    }

    async fn stop_activity_stream(
        &self,
        request: StopActivityStreamRequest,
    ) -> Result<StopActivityStreamResponse, ControlPlaneError> {
        let settle_after = self.settle_after;
        let mut state = self.lock();
        state.calls.push(ControlPlaneCall::Stop(request.clone()));

        let cluster = state.cluster_mut(&request.resource_arn)?;
        let response = StopActivityStreamResponse {
            kms_key_id: cluster.kms_key_id.clone(),
            kinesis_stream_name: cluster.kinesis_stream_name.clone(),
            status: None,
        };

        if cluster.status == status::STARTING || cluster.status == status::STARTED {
            if settle_after == 0 {
                cluster.settle_stopped();
            } else {
                cluster.status = status::STOPPING.to_string();
                cluster.observations_left = settle_after;
            }
        }

        Ok(StopActivityStreamResponse {
            status: Some(cluster.status.clone()),
            ..response
        })
    }

    async fn describe_db_clusters(
        &self,
        request: DescribeDbClustersRequest,
    ) -> Result<DescribeDbClustersResponse, ControlPlaneError> {
        let mut state = self.lock();
        let cluster = state.cluster_mut(&request.db_cluster_identifier)?;
        cluster.observe();

        Ok(DescribeDbClustersResponse {
            db_clusters: vec![cluster.describe()],
        })
    }
}
