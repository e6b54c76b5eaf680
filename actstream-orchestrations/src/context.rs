//! Everything an orchestration needs: the control plane client and timing

use std::sync::Arc;
use std::time::Duration;

use crate::control_plane::ControlPlane;
use crate::waiter::PollSettings;

/// Default create and delete timeout; multi-node clusters take a while
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(120 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_OPERATION_TIMEOUT,
            delete: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct ReconcileContext {
    client: Arc<dyn ControlPlane>,
    pub timeouts: Timeouts,
    pub polling: PollSettings,
}

impl ReconcileContext {
    pub fn new(client: Arc<dyn ControlPlane>) -> Self {
        Self {
            client,
            timeouts: Timeouts::default(),
            polling: PollSettings::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_polling(mut self, polling: PollSettings) -> Self {
        self.polling = polling;
        self
    }

    pub fn client(&self) -> &dyn ControlPlane {
        self.client.as_ref()
    }
}
