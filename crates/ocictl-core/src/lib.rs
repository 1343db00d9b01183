//! # ocictl-core
//!
//! Shared engine behind the `ocictl` command line tool. The CLI is a thin
//! layer over the pieces in this crate:
//!
//! - [`waiter`] - issue an instance action and poll until the target
//!   lifecycle state is reached, with precondition gating, a settle delay,
//!   a wall-clock deadline and cooperative cancellation
//! - [`pager`] - walk a cursor-paginated listing to completion, either
//!   eagerly or as a lazy, restartable stream
//! - [`stats`] - reduce metric samples to min/max/average/count
//! - [`monitor`] and [`instances`] - the workflows the CLI exposes
//! - [`provider`] - the traits a cloud binding implements; [`oci`] is the
//!   binding that drives the official `oci` command line tool
//! - [`auth`] - the explicit authentication context established before any
//!   command runs
//! - [`config`] - ocictl settings and OCI credential profiles
//!
//! Nothing in here retries on its own. Every failure surfaces as a typed
//! [`CoreError`] and the caller decides what to do with it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ocictl_core::{TransitionSpec, TransitionWaiter, WaitOptions};
//!
//! let waiter = TransitionWaiter::new(&client);
//! let outcome = waiter
//!     .run(instance_id, &TransitionSpec::start(), &WaitOptions::default())
//!     .await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod instances;
pub mod model;
pub mod monitor;
pub mod oci;
pub mod pager;
pub mod progress;
pub mod provider;
pub mod stats;
pub mod waiter;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use auth::AuthContext;
pub use config::{ConfigError, OciProfile, Settings};
pub use error::{CoreError, Result};
pub use model::{
    Compartment, Instance, InstanceAction, LifecycleState, MetricSample, MetricSeries, Page, User,
};
pub use instances::{CompartmentEntry, Renamed};
pub use monitor::{Lookback, MetricKind, MetricSummary, MonitorReport, monitor_instance};
pub use oci::OciCli;
pub use pager::Paginator;
pub use progress::{ProgressCallback, ProgressEvent};
pub use provider::{ComputeApi, IdentityApi, MetricQuery, MonitoringApi};
pub use stats::{Summary, summarize};
pub use waiter::{Transition, TransitionSpec, TransitionWaiter, WaitOptions};
