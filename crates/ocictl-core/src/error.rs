//! Unified error handling for ocictl-core
//!
//! Every operation in the core returns [`Result`]. The variants map onto the
//! failure kinds a caller has to tell apart: a remote failure that may be
//! worth retrying as a whole, a local precondition rejection, a deadline that
//! ran out, and an authentication probe that failed.
//!
//! # Example
//!
//! ```rust
//! use ocictl_core::{CoreError, LifecycleState};
//! use std::time::Duration;
//!
//! let err = CoreError::Timeout {
//!     target: LifecycleState::Running,
//!     last_seen: LifecycleState::Starting,
//!     waited: Duration::from_secs(300),
//! };
//! assert!(err.is_timeout());
//! assert!(err.is_retryable());
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{InstanceAction, LifecycleState};

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Transport or service-side failure reported by the provider
    #[error("Remote error: {message}")]
    Remote { message: String },

    /// The action is not valid from the resource's current state
    #[error("Cannot {action} an instance that is {current}")]
    PreconditionNotMet {
        action: InstanceAction,
        current: LifecycleState,
    },

    /// The poll loop ran past its deadline
    #[error("Timed out after {waited:?} waiting for {target} (last seen: {last_seen})")]
    Timeout {
        target: LifecycleState,
        last_seen: LifecycleState,
        waited: Duration,
    },

    /// The resource reached a state it can never leave towards the target
    #[error("Instance entered terminal state {state}")]
    TerminalState { state: LifecycleState },

    /// The wait was cancelled before the target state was observed
    #[error("Operation cancelled")]
    Cancelled,

    /// The credential probe failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Invalid input rejected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded or resolved
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider output could not be decoded
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Shorthand for a [`CoreError::Remote`] with the given message
    pub fn remote(message: impl Into<String>) -> Self {
        CoreError::Remote {
            message: message.into(),
        }
    }

    /// Returns true if the operation gave up waiting
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout { .. })
    }

    /// Returns true if the operation was rejected by a local precondition
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, CoreError::PreconditionNotMet { .. })
    }

    /// Returns true for authentication failures
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Authentication { .. } => true,
            CoreError::Remote { message } => {
                let lower = message.to_lowercase();
                lower.contains("notauthenticated") || lower.contains("401")
            }
            _ => false,
        }
    }

    /// Returns true if re-invoking the whole operation might succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Remote { .. } | CoreError::Timeout { .. })
    }
}
