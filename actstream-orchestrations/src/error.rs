use actstream_models::ModelError;
use thiserror::Error;

use crate::control_plane::ControlPlaneError;
use crate::types::UpdatePhase;
use crate::waiter::WaitError;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("invalid activity stream configuration: {0}")]
    Validation(#[from] ModelError),

    #[error("error calling {operation} for {resource_arn}: {source}")]
    RemoteCall {
        operation: &'static str,
        resource_arn: String,
        #[source]
        source: ControlPlaneError,
    },

    #[error(transparent)]
    Wait(#[from] WaitError),

    /// A read that had to find a running stream came back empty
    #[error("{reason}: {resource_arn}")]
    Disappeared {
        reason: &'static str,
        resource_arn: String,
    },

    #[error("replacing activity stream for {resource_arn} failed during {phase}: {source}")]
    Update {
        phase: UpdatePhase,
        resource_arn: String,
        #[source]
        source: Box<StreamError>,
    },
}

impl StreamError {
    pub(crate) fn remote(
        operation: &'static str,
        resource_arn: &str,
        source: ControlPlaneError,
    ) -> Self {
        StreamError::RemoteCall {
            operation,
            resource_arn: resource_arn.to_string(),
            source,
        }
    }

    /// True when the operation gave up because convergence took too long
    pub fn is_timeout(&self) -> bool {
        match self {
            StreamError::Wait(WaitError::Timeout { .. }) => true,
            StreamError::Update { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
