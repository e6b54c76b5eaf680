//! Outcomes of the update and apply orchestrations

use std::fmt;

use actstream_models::{ActivityStreamRecord, ReplacementField};
use serde::{Deserialize, Serialize};

/// Phase of a stop-then-start replacement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePhase {
    /// Stopping the running stream
    Teardown,
    /// Starting the stream with the new configuration
    Restart,
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePhase::Teardown => f.write_str("teardown"),
            UpdatePhase::Restart => f.write_str("restart"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// Nothing changed; carries the refreshed record
    Unchanged { record: ActivityStreamRecord },
    /// Stream was stopped and started with the new configuration
    Replaced {
        record: ActivityStreamRecord,
        changes: Vec<ReplacementField>,
    },
    /// Nothing changed but the stream no longer exists remotely
    Gone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Created {
        record: ActivityStreamRecord,
    },
    Replaced {
        record: ActivityStreamRecord,
        changes: Vec<ReplacementField>,
    },
    Unchanged {
        record: ActivityStreamRecord,
    },
}

impl ApplyOutcome {
    pub fn record(&self) -> &ActivityStreamRecord {
        match self {
            ApplyOutcome::Created { record }
            | ApplyOutcome::Replaced { record, .. }
            | ApplyOutcome::Unchanged { record } => record,
        }
    }
}
