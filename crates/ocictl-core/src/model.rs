//! Domain types shared by the provider traits, the workflows and the CLI
//!
//! Field names are read in the provider's kebab-case spelling
//! (`lifecycle-state`) and written back out in snake_case.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a compute instance
///
/// Values the provider may add later are kept verbatim in
/// [`LifecycleState::Unknown`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleState {
    Provisioning,
    Starting,
    Running,
    Stopping,
    Stopped,
    CreatingImage,
    Moving,
    Terminating,
    Terminated,
    Unknown(String),
}

impl LifecycleState {
    /// Provider spelling of the state
    pub fn as_str(&self) -> &str {
        match self {
            LifecycleState::Provisioning => "PROVISIONING",
            LifecycleState::Starting => "STARTING",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Stopping => "STOPPING",
            LifecycleState::Stopped => "STOPPED",
            LifecycleState::CreatingImage => "CREATING_IMAGE",
            LifecycleState::Moving => "MOVING",
            LifecycleState::Terminating => "TERMINATING",
            LifecycleState::Terminated => "TERMINATED",
            LifecycleState::Unknown(raw) => raw,
        }
    }

    /// True for states an instance never comes back from
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            LifecycleState::Terminating | LifecycleState::Terminated
        )
    }
}

impl From<String> for LifecycleState {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PROVISIONING" => LifecycleState::Provisioning,
            "STARTING" => LifecycleState::Starting,
            "RUNNING" => LifecycleState::Running,
            "STOPPING" => LifecycleState::Stopping,
            "STOPPED" => LifecycleState::Stopped,
            "CREATING_IMAGE" => LifecycleState::CreatingImage,
            "MOVING" => LifecycleState::Moving,
            "TERMINATING" => LifecycleState::Terminating,
            "TERMINATED" => LifecycleState::Terminated,
            _ => LifecycleState::Unknown(raw),
        }
    }
}

impl From<&str> for LifecycleState {
    fn from(raw: &str) -> Self {
        LifecycleState::from(raw.to_string())
    }
}

impl From<LifecycleState> for String {
    fn from(state: LifecycleState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State-changing request submitted against an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceAction {
    #[serde(rename = "START")]
    Start,
    #[serde(rename = "STOP")]
    Stop,
    #[serde(rename = "SOFTRESET")]
    SoftReset,
}

impl InstanceAction {
    /// Provider spelling of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceAction::Start => "START",
            InstanceAction::Stop => "STOP",
            InstanceAction::SoftReset => "SOFTRESET",
        }
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compute instance as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "kebab-case"))]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub lifecycle_state: LifecycleState,
    #[serde(default)]
    pub compartment_id: String,
    #[serde(default)]
    pub availability_domain: String,
    #[serde(default)]
    pub shape: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
}

/// An identity compartment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "kebab-case"))]
pub struct Compartment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub lifecycle_state: String,
    /// Parent compartment; absent for the tenancy itself
    #[serde(default)]
    pub compartment_id: Option<String>,
}

/// The user behind a credential profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "kebab-case"))]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One timestamped data point of a metric stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Data points of one metric stream, grouped by its dimensions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "kebab-case"))]
pub struct MetricSeries {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    #[serde(default, alias = "aggregated-datapoints")]
    pub samples: Vec<MetricSample>,
}

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` ends the listing
    pub next_page: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page: Option<String>) -> Self {
        Self { items, next_page }
    }

    /// A page with no successor
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }
}
