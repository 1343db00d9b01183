//! Transition waiter: drive an instance to a target lifecycle state
//!
//! The provider accepts lifecycle actions fire-and-forget, so completion is
//! only observable by polling. [`TransitionWaiter::run`] wraps the whole
//! exchange:
//!
//! 1. read the current state
//! 2. short-circuit if the instance already sits in the target state
//! 3. reject the action if the current state doesn't allow it
//! 4. submit the action exactly once
//! 5. optionally wait a fixed settle delay
//! 6. poll until the target state, a terminal state, the deadline, or
//!    cancellation
//!
//! Each flow (start, stop, soft reset) is a [`TransitionSpec`]; the loop
//! itself is shared.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::model::{InstanceAction, LifecycleState};
use crate::progress::{ProgressCallback, ProgressEvent, emit};
use crate::provider::ComputeApi;

/// Settle delay before polling a soft reset; the instance keeps reporting
/// RUNNING for a moment before it actually cycles.
pub const SOFT_RESET_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Default deadline for the poll loop
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// Default time between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How one lifecycle action is carried out and verified
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSpec {
    pub action: InstanceAction,
    /// State that marks the action as complete
    pub target: LifecycleState,
    /// States from which the action may be submitted
    pub allowed_from: Vec<LifecycleState>,
    /// Report success without acting when the instance is already in `target`
    pub skip_if_in_target: bool,
    /// Pause between submitting the action and the first poll
    pub settle_delay: Duration,
}

impl TransitionSpec {
    /// STOPPED -> RUNNING
    pub fn start() -> Self {
        Self {
            action: InstanceAction::Start,
            target: LifecycleState::Running,
            allowed_from: vec![LifecycleState::Stopped],
            skip_if_in_target: true,
            settle_delay: Duration::ZERO,
        }
    }

    /// RUNNING -> STOPPED
    pub fn stop() -> Self {
        Self {
            action: InstanceAction::Stop,
            target: LifecycleState::Stopped,
            allowed_from: vec![LifecycleState::Running],
            skip_if_in_target: true,
            settle_delay: Duration::ZERO,
        }
    }

    /// RUNNING -> (reboot) -> RUNNING
    pub fn soft_reset() -> Self {
        Self {
            action: InstanceAction::SoftReset,
            target: LifecycleState::Running,
            allowed_from: vec![LifecycleState::Running],
            skip_if_in_target: false,
            settle_delay: SOFT_RESET_SETTLE_DELAY,
        }
    }

    pub fn for_action(action: InstanceAction) -> Self {
        match action {
            InstanceAction::Start => Self::start(),
            InstanceAction::Stop => Self::stop(),
            InstanceAction::SoftReset => Self::soft_reset(),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Whether the action may be submitted from `state`
    pub fn allows(&self, state: &LifecycleState) -> bool {
        self.allowed_from.contains(state)
    }
}

/// Deadline and cadence of the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Upper bound on the poll loop, measured from the first poll
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            max_wait: DEFAULT_MAX_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    pub fn new(max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            max_wait,
            poll_interval,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(CoreError::Validation(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Successful outcome of a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing was submitted; the instance was already in this state
    AlreadyInState(LifecycleState),
    /// The action was submitted and the target state observed
    Completed {
        /// Polls issued after the action, including the one that saw the target
        polls: u32,
        /// Time from the first poll to the successful one
        elapsed: Duration,
    },
}

/// Runs [`TransitionSpec`]s against a compute provider
pub struct TransitionWaiter<'a> {
    compute: &'a dyn ComputeApi,
    cancel: CancellationToken,
    on_progress: Option<ProgressCallback>,
}

impl<'a> TransitionWaiter<'a> {
    pub fn new(compute: &'a dyn ComputeApi) -> Self {
        Self {
            compute,
            cancel: CancellationToken::new(),
            on_progress: None,
        }
    }

    /// Stop waiting as soon as `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Carry out `spec` on `instance_id` and wait for the target state
    pub async fn run(
        &self,
        instance_id: &str,
        spec: &TransitionSpec,
        options: &WaitOptions,
    ) -> Result<Transition> {
        options.validate()?;
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let current = self.compute.get_state(instance_id).await?;
        debug!(instance_id, %current, action = %spec.action, "Current state");

        if spec.skip_if_in_target && current == spec.target {
            info!(instance_id, state = %current, "Instance already in target state");
            return Ok(Transition::AlreadyInState(current));
        }

        if !spec.allows(&current) {
            return Err(CoreError::PreconditionNotMet {
                action: spec.action,
                current,
            });
        }

        self.compute.instance_action(instance_id, spec.action).await?;
        info!(instance_id, action = %spec.action, "Action submitted");
        emit(
            &self.on_progress,
            ProgressEvent::Started {
                instance_id: instance_id.to_string(),
                action: spec.action,
            },
        );

        if !spec.settle_delay.is_zero() {
            emit(
                &self.on_progress,
                ProgressEvent::Settling {
                    delay: spec.settle_delay,
                },
            );
            self.pause(instance_id, spec.settle_delay).await?;
        }

        let result = self.poll_until(instance_id, spec, options).await;
        if let Err(e) = &result {
            emit(
                &self.on_progress,
                ProgressEvent::Failed {
                    instance_id: instance_id.to_string(),
                    error: e.to_string(),
                },
            );
        }
        result
    }

    async fn poll_until(
        &self,
        instance_id: &str,
        spec: &TransitionSpec,
        options: &WaitOptions,
    ) -> Result<Transition> {
        let start = Instant::now();
        let deadline = start + options.max_wait;
        let mut polls: u32 = 0;

        loop {
            let state = self.compute.get_state(instance_id).await?;
            polls += 1;
            let elapsed = start.elapsed();

            emit(
                &self.on_progress,
                ProgressEvent::Polling {
                    instance_id: instance_id.to_string(),
                    state: state.clone(),
                    poll: polls,
                    elapsed,
                },
            );
            debug!(instance_id, %state, poll = polls, ?elapsed, "Polled instance");

            if state == spec.target {
                info!(instance_id, %state, polls, ?elapsed, "Target state reached");
                emit(
                    &self.on_progress,
                    ProgressEvent::Completed {
                        instance_id: instance_id.to_string(),
                        state,
                    },
                );
                return Ok(Transition::Completed { polls, elapsed });
            }

            if state.is_terminal_failure() && !spec.target.is_terminal_failure() {
                warn!(instance_id, %state, "Instance entered a terminal state");
                return Err(CoreError::TerminalState { state });
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(CoreError::Timeout {
                    target: spec.target.clone(),
                    last_seen: state,
                    waited: elapsed,
                });
            }

            // Clamp the last sleep so the final poll lands on the deadline.
            let nap = options.poll_interval.min(deadline - now);
            self.pause(instance_id, nap).await?;
        }
    }

    async fn pause(&self, instance_id: &str, duration: Duration) -> Result<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                info!(instance_id, "Wait cancelled");
                Err(CoreError::Cancelled)
            }
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
