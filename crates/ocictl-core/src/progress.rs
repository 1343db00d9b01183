//! Progress events for instance transitions
//!
//! The transition waiter reports what it is doing through an optional
//! callback. The CLI turns these into spinner updates; library callers that
//! don't care simply pass nothing.

use std::time::Duration;

use crate::model::{InstanceAction, LifecycleState};

/// Progress events emitted while driving an instance to a target state
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The action request was accepted by the provider
    Started {
        instance_id: String,
        action: InstanceAction,
    },
    /// Waiting before the first poll so stale state isn't observed
    Settling { delay: Duration },
    /// One poll iteration
    Polling {
        instance_id: String,
        state: LifecycleState,
        poll: u32,
        elapsed: Duration,
    },
    /// Target state observed
    Completed {
        instance_id: String,
        state: LifecycleState,
    },
    /// The wait ended without reaching the target
    Failed { instance_id: String, error: String },
}

/// Callback type for progress updates
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Helper to emit progress events
pub(crate) fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
