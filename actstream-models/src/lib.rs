use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating declared activity stream configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("expected mode to be one of [sync async], got {0:?}")]
    InvalidMode(String),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Activity stream statuses reported by the control plane
pub mod status {
    pub const STARTING: &str = "starting";
    pub const STARTED: &str = "started";
    pub const STOPPING: &str = "stopping";
    pub const STOPPED: &str = "stopped";
}

/// Write semantics of an activity stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    Sync,
    Async,
}

impl StreamMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamMode::Sync => "sync",
            StreamMode::Async => "async",
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamMode {
    type Err = ModelError;

    // Case-sensitive, like the control plane itself
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(StreamMode::Sync),
            "async" => Ok(StreamMode::Async),
            other => Err(ModelError::InvalidMode(other.to_string())),
        }
    }
}

/// Fields whose change forces the stream to be stopped and started again
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementField {
    Arn,
    ApplyImmediately,
    KmsKeyId,
    Mode,
}

impl fmt::Display for ReplacementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementField::Arn => "arn",
            ReplacementField::ApplyImmediately => "apply_immediately",
            ReplacementField::KmsKeyId => "kms_key_id",
            ReplacementField::Mode => "mode",
        };
        f.write_str(name)
    }
}

/// Declared (desired) configuration of one cluster's activity stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityStreamConfig {
    /// Cluster ARN, also the identity of the resulting record
    #[serde(rename = "arn")]
    pub resource_arn: String,
    /// Apply start/stop immediately instead of in the next maintenance window
    #[serde(default)]
    pub apply_immediately: bool,
    /// KMS key used to encrypt the stream
    pub kms_key_id: String,
    pub mode: StreamMode,
}

impl ActivityStreamConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.resource_arn.trim().is_empty() {
            return Err(ModelError::EmptyField("arn"));
        }
        if self.kms_key_id.trim().is_empty() {
            return Err(ModelError::EmptyField("kms_key_id"));
        }
        Ok(())
    }

    /// Fields that differ from `prior`, in declaration order.
    ///
    /// Every field of the config is immutable on a running stream, so any
    /// entry in the result means a full stop and start.
    pub fn replacement_changes(&self, prior: &ActivityStreamConfig) -> Vec<ReplacementField> {
        let mut changes = Vec::new();
        if self.resource_arn != prior.resource_arn {
            changes.push(ReplacementField::Arn);
        }
        if self.apply_immediately != prior.apply_immediately {
            changes.push(ReplacementField::ApplyImmediately);
        }
        if self.kms_key_id != prior.kms_key_id {
            changes.push(ReplacementField::KmsKeyId);
        }
        if self.mode != prior.mode {
            changes.push(ReplacementField::Mode);
        }
        changes
    }
}

/// Observed state of an activity stream, keyed by the cluster ARN
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityStreamRecord {
    pub id: String,
    #[serde(rename = "arn")]
    pub resource_arn: String,
    /// Write-only: carried from the declared config, never read back
    #[serde(default)]
    pub apply_immediately: bool,
    pub kms_key_id: String,
    pub mode: StreamMode,
    pub kinesis_stream_name: Option<String>,
}

impl ActivityStreamRecord {
    pub fn config(&self) -> ActivityStreamConfig {
        ActivityStreamConfig {
            resource_arn: self.resource_arn.clone(),
            apply_immediately: self.apply_immediately,
            kms_key_id: self.kms_key_id.clone(),
            mode: self.mode,
        }
    }
}

// ============================================================================
// Control plane wire types
// ============================================================================

/// Error codes returned in [`ApiErrorBody::code`]
pub mod error_codes {
    pub const DB_CLUSTER_NOT_FOUND: &str = "DBClusterNotFoundFault";
    pub const INVALID_PARAMETER_COMBINATION: &str = "InvalidParameterCombination";
    pub const INVALID_DB_CLUSTER_STATE: &str = "InvalidDBClusterStateFault";
    pub const VALIDATION: &str = "ValidationError";
}

/// Message accompanying the retryable "cluster not ready yet" rejection
pub const ACTIVITY_STREAMS_NOT_SUPPORTED: &str =
    "Activity Streams is not supported for this configuration";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartActivityStreamRequest {
    pub resource_arn: String,
    pub kms_key_id: String,
    pub mode: StreamMode,
    pub apply_immediately: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartActivityStreamResponse {
    pub kms_key_id: Option<String>,
    pub kinesis_stream_name: Option<String>,
    pub status: Option<String>,
    pub mode: Option<StreamMode>,
    pub apply_immediately: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StopActivityStreamRequest {
    pub resource_arn: String,
    pub apply_immediately: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StopActivityStreamResponse {
    pub kms_key_id: Option<String>,
    pub kinesis_stream_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescribeDbClustersRequest {
    /// Cluster identifier or ARN
    pub db_cluster_identifier: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescribeDbClustersResponse {
    #[serde(default)]
    pub db_clusters: Vec<DbCluster>,
}

/// Activity stream attributes of one database cluster
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbCluster {
    pub db_cluster_identifier: String,
    pub db_cluster_arn: String,
    #[serde(default)]
    pub activity_stream_status: Option<String>,
    #[serde(default)]
    pub activity_stream_mode: Option<String>,
    #[serde(default)]
    pub activity_stream_kms_key_id: Option<String>,
    #[serde(default)]
    pub activity_stream_kinesis_stream_name: Option<String>,
}

/// Body of every non-2xx control plane response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: StreamMode) -> ActivityStreamConfig {
        ActivityStreamConfig {
            resource_arn: "arn:aws:rds:us-west-2:123456789012:cluster:db-1".to_string(),
            apply_immediately: false,
            kms_key_id: "key-1".to_string(),
            mode,
        }
    }

    #[test]
    fn test_mode_parsing_is_case_sensitive() {
        assert_eq!("sync".parse::<StreamMode>(), Ok(StreamMode::Sync));
        assert_eq!("async".parse::<StreamMode>(), Ok(StreamMode::Async));
        assert_eq!(
            "ASYNC".parse::<StreamMode>(),
            Err(ModelError::InvalidMode("ASYNC".to_string()))
        );
        assert!("".parse::<StreamMode>().is_err());
    }

    #[test]
    fn test_config_uses_declared_field_names() {
        let parsed: ActivityStreamConfig = serde_json::from_str(
            r#"{"arn": "db-1", "kms_key_id": "key-1", "mode": "async"}"#,
        )
        .unwrap();

        assert_eq!(parsed.resource_arn, "db-1");
        assert!(!parsed.apply_immediately);
        assert_eq!(parsed.mode, StreamMode::Async);

        let rejected = serde_json::from_str::<ActivityStreamConfig>(
            r#"{"arn": "db-1", "kms_key_id": "key-1", "mode": "fast"}"#,
        );
        assert!(rejected.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_identity() {
        let mut cfg = config(StreamMode::Sync);
        assert!(cfg.validate().is_ok());

        cfg.kms_key_id = "  ".to_string();
        assert_eq!(cfg.validate(), Err(ModelError::EmptyField("kms_key_id")));

        cfg.resource_arn.clear();
        assert_eq!(cfg.validate(), Err(ModelError::EmptyField("arn")));
    }

    #[test]
    fn test_replacement_changes() {
        let prior = config(StreamMode::Sync);
        assert!(prior.replacement_changes(&prior).is_empty());

        let mut desired = config(StreamMode::Async);
        desired.apply_immediately = true;
        assert_eq!(
            desired.replacement_changes(&prior),
            vec![ReplacementField::ApplyImmediately, ReplacementField::Mode]
        );

        desired.kms_key_id = "key-2".to_string();
        desired.resource_arn = "db-2".to_string();
        assert_eq!(desired.replacement_changes(&prior).len(), 4);
    }

    #[test]
    fn test_record_config_keeps_write_only_flag() {
        let record = ActivityStreamRecord {
            id: "db-1".to_string(),
            resource_arn: "db-1".to_string(),
            apply_immediately: true,
            kms_key_id: "key-1".to_string(),
            mode: StreamMode::Async,
            kinesis_stream_name: Some("aws-rds-das-cluster-abc".to_string()),
        };

        let cfg = record.config();
        assert!(cfg.apply_immediately);
        assert_eq!(cfg.mode, StreamMode::Async);
    }

    #[test]
    fn test_describe_response_tolerates_missing_stream_fields() {
        let parsed: DescribeDbClustersResponse = serde_json::from_str(
            r#"{"db_clusters": [{"db_cluster_identifier": "db-1", "db_cluster_arn": "arn:db-1"}]}"#,
        )
        .unwrap();

        assert_eq!(parsed.db_clusters.len(), 1);
        assert_eq!(parsed.db_clusters[0].activity_stream_status, None);

        let empty: DescribeDbClustersResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.db_clusters.is_empty());
    }
}
