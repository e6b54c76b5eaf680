//! Entry point for the declaration layer: one method per lifecycle operation

use std::sync::Arc;

use actstream_models::{ActivityStreamConfig, ActivityStreamRecord};

use crate::context::{ReconcileContext, Timeouts};
use crate::control_plane::ControlPlane;
use crate::error::StreamError;
use crate::orchestrations::{
    apply_stream::apply_stream_orchestration, create_stream::create_stream_orchestration,
    delete_stream::delete_stream_orchestration, import_stream::import_stream_orchestration,
    read_stream::read_stream_orchestration, update_stream::update_stream_orchestration,
};
use crate::types::{ApplyOutcome, UpdateOutcome};
use crate::waiter::PollSettings;

/// Reconciles activity stream records against the control plane
#[derive(Clone)]
pub struct ActivityStreamReconciler {
    ctx: ReconcileContext,
}

impl ActivityStreamReconciler {
    pub fn new(client: Arc<dyn ControlPlane>) -> Self {
        Self {
            ctx: ReconcileContext::new(client),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.ctx = self.ctx.with_timeouts(timeouts);
        self
    }

    pub fn with_polling(mut self, polling: PollSettings) -> Self {
        self.ctx = self.ctx.with_polling(polling);
        self
    }

    pub fn context(&self) -> &ReconcileContext {
        &self.ctx
    }

    /// Start the stream and wait until it is `started`
    pub async fn create(&self, config: ActivityStreamConfig) -> Result<ActivityStreamRecord, StreamError> {
        create_stream_orchestration(&self.ctx, config).await
    }

    /// `None` when the stream no longer exists
    pub async fn read(&self, id: &str) -> Result<Option<ActivityStreamRecord>, StreamError> {
        read_stream_orchestration(&self.ctx, id).await
    }

    pub async fn update(
        &self,
        prior: &ActivityStreamRecord,
        desired: ActivityStreamConfig,
    ) -> Result<UpdateOutcome, StreamError> {
        update_stream_orchestration(&self.ctx, prior, desired).await
    }

    /// Stop the stream and wait until it is `stopped`
    pub async fn delete(&self, id: &str) -> Result<(), StreamError> {
        delete_stream_orchestration(&self.ctx, id).await
    }

    pub async fn import(&self, id: &str) -> Result<ActivityStreamRecord, StreamError> {
        import_stream_orchestration(&self.ctx, id).await
    }

    pub async fn apply(&self, desired: ActivityStreamConfig) -> Result<ApplyOutcome, StreamError> {
        apply_stream_orchestration(&self.ctx, desired).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{ControlPlaneCall, SandboxControlPlane};
    use actstream_models::{status, StartActivityStreamRequest, StreamMode};

    #[tokio::test(start_paused = true)]
    async fn test_full_lifecycle() {
        let sandbox = Arc::new(SandboxControlPlane::with_settle_after(2));
        sandbox.add_cluster("db-1");
        let reconciler = ActivityStreamReconciler::new(sandbox.clone());

        let record = reconciler
            .create(ActivityStreamConfig {
                resource_arn: "db-1".to_string(),
                apply_immediately: true,
                kms_key_id: "key-1".to_string(),
                mode: StreamMode::Async,
            })
            .await
            .unwrap();

        assert_eq!(
            sandbox.calls()[0],
            ControlPlaneCall::Start(StartActivityStreamRequest {
                resource_arn: "db-1".to_string(),
                kms_key_id: "key-1".to_string(),
                mode: StreamMode::Async,
                apply_immediately: true,
            })
        );
        assert_eq!(record.id, "db-1");
        assert_eq!(record.kms_key_id, "key-1");
        assert_eq!(record.mode, StreamMode::Async);
        assert!(!record.kinesis_stream_name.clone().unwrap_or_default().is_empty());

        let read = reconciler.read("db-1").await.unwrap().unwrap();
        assert_eq!(read.kinesis_stream_name, record.kinesis_stream_name);

        let mut desired = record.config();
        desired.mode = StreamMode::Sync;
        let updated = reconciler.update(&record, desired).await.unwrap();
        assert!(matches!(updated, UpdateOutcome::Replaced { ref record, .. } if record.mode == StreamMode::Sync));
        assert_eq!(sandbox.stream_status("db-1").as_deref(), Some(status::STARTED));

        reconciler.delete("db-1").await.unwrap();
        reconciler.delete("db-1").await.unwrap();
        assert_eq!(reconciler.read("db-1").await.unwrap(), None);
        assert!(reconciler.import("db-1").await.is_err());
    }
}
