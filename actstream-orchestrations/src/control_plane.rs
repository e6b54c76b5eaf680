//! Control plane client interface shared by activities, the HTTP client and the sandbox

use actstream_models::{
    error_codes, ApiErrorBody, DescribeDbClustersRequest, DescribeDbClustersResponse,
    StartActivityStreamRequest, StartActivityStreamResponse, StopActivityStreamRequest,
    StopActivityStreamResponse, ACTIVITY_STREAMS_NOT_SUPPORTED,
};
use async_trait::async_trait;
use thiserror::Error;

/// HTTP routes of the control plane API
pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const START_ACTIVITY_STREAM: &str = "/v1/activity-streams/start";
    pub const STOP_ACTIVITY_STREAM: &str = "/v1/activity-streams/stop";
    pub const DESCRIBE_DB_CLUSTERS: &str = "/v1/db-clusters/describe";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    #[error("DBClusterNotFoundFault: {message}")]
    NotFound { message: String },

    #[error("InvalidParameterCombination: {message}")]
    InvalidParameterCombination { message: String },

    #[error("{code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid control plane response: {0}")]
    InvalidResponse(String),

    #[error("control plane request failed: {0}")]
    Transport(String),
}

impl ControlPlaneError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ControlPlaneError::NotFound {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ControlPlaneError::NotFound { .. })
    }

    /// The cluster cannot take an activity stream yet (usually still provisioning)
    pub fn is_unsupported_configuration(&self) -> bool {
        match self {
            ControlPlaneError::InvalidParameterCombination { message } => {
                message.contains(ACTIVITY_STREAMS_NOT_SUPPORTED)
            }
            _ => false,
        }
    }

    pub fn from_api_body(status: u16, body: ApiErrorBody) -> Self {
        match body.code.as_str() {
            error_codes::DB_CLUSTER_NOT_FOUND => ControlPlaneError::NotFound {
                message: body.message,
            },
            error_codes::INVALID_PARAMETER_COMBINATION => {
                ControlPlaneError::InvalidParameterCombination {
                    message: body.message,
                }
            }
            _ => ControlPlaneError::Api {
                status,
                code: body.code,
                message: body.message,
            },
        }
    }

    /// HTTP status and wire body for this error, as served by the sandbox
    pub fn to_api_body(&self) -> (u16, ApiErrorBody) {
        match self {
            ControlPlaneError::NotFound { message } => (
                404,
                ApiErrorBody {
                    code: error_codes::DB_CLUSTER_NOT_FOUND.to_string(),
                    message: message.clone(),
                },
            ),
            ControlPlaneError::InvalidParameterCombination { message } => (
                400,
                ApiErrorBody {
                    code: error_codes::INVALID_PARAMETER_COMBINATION.to_string(),
                    message: message.clone(),
                },
            ),
            ControlPlaneError::Api {
                status,
                code,
                message,
            } => (
                *status,
                ApiErrorBody {
                    code: code.clone(),
                    message: message.clone(),
                },
            ),
            ControlPlaneError::InvalidResponse(message) | ControlPlaneError::Transport(message) => (
                500,
                ApiErrorBody {
                    code: "InternalFailure".to_string(),
                    message: message.clone(),
                },
            ),
        }
    }
}

/// Managed database control plane, as far as activity streams are concerned
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn start_activity_stream(
        &self,
        request: StartActivityStreamRequest,
    ) -> Result<StartActivityStreamResponse, ControlPlaneError>;

    async fn stop_activity_stream(
        &self,
        request: StopActivityStreamRequest,
    ) -> Result<StopActivityStreamResponse, ControlPlaneError>;

    /// Fails with [`ControlPlaneError::NotFound`] when no cluster matches
    async fn describe_db_clusters(
        &self,
        request: DescribeDbClustersRequest,
    ) -> Result<DescribeDbClustersResponse, ControlPlaneError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_body_codes_map_to_variants() {
        let not_found = ControlPlaneError::from_api_body(
            404,
            ApiErrorBody {
                code: error_codes::DB_CLUSTER_NOT_FOUND.to_string(),
                message: "DBCluster db-1 not found.".to_string(),
            },
        );
        assert!(not_found.is_not_found());

        let not_ready = ControlPlaneError::from_api_body(
            400,
            ApiErrorBody {
                code: error_codes::INVALID_PARAMETER_COMBINATION.to_string(),
                message: format!("{}.", ACTIVITY_STREAMS_NOT_SUPPORTED),
            },
        );
        assert!(not_ready.is_unsupported_configuration());

        let other = ControlPlaneError::from_api_body(
            400,
            ApiErrorBody {
                code: error_codes::INVALID_PARAMETER_COMBINATION.to_string(),
                message: "KMS key is disabled".to_string(),
            },
        );
        assert!(!other.is_unsupported_configuration());
    }

    #[test]
    fn test_to_api_body_preserves_code() {
        let err = ControlPlaneError::Api {
            status: 409,
            code: error_codes::INVALID_DB_CLUSTER_STATE.to_string(),
            message: "busy".to_string(),
        };
        let (status, body) = err.to_api_body();
        assert_eq!(status, 409);
        assert_eq!(ControlPlaneError::from_api_body(status, body), err);
    }
}
