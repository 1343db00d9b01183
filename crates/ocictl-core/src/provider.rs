//! Provider capabilities the core depends on
//!
//! A cloud binding implements these traits; the workflows only ever see the
//! traits, which is what lets the tests drive them with scripted fakes.
//! Implementations must not retry on their own: a failed call surfaces as
//! [`CoreError::Remote`](crate::CoreError::Remote).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{Compartment, Instance, InstanceAction, LifecycleState, MetricSeries, Page, User};

/// Compute service: instance reads and state-changing requests
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Fetch the current view of an instance
    async fn get_instance(&self, instance_id: &str) -> Result<Instance>;

    /// Submit a lifecycle action; completion is only observable by polling
    async fn instance_action(&self, instance_id: &str, action: InstanceAction) -> Result<()>;

    /// Change the display name of an instance
    async fn update_display_name(&self, instance_id: &str, display_name: &str)
    -> Result<Instance>;

    /// Fetch one page of instances in a compartment, optionally filtered by
    /// lifecycle state on the server side
    async fn list_instances(
        &self,
        compartment_id: &str,
        state: Option<&LifecycleState>,
        page: Option<&str>,
    ) -> Result<Page<Instance>>;

    /// Current lifecycle state of an instance
    async fn get_state(&self, instance_id: &str) -> Result<LifecycleState> {
        Ok(self.get_instance(instance_id).await?.lifecycle_state)
    }
}

/// Identity service: users and compartments
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<User>;

    async fn get_compartment(&self, compartment_id: &str) -> Result<Compartment>;

    /// Fetch one page of the compartments below `parent_id`, whole subtree
    async fn list_compartments(
        &self,
        parent_id: &str,
        page: Option<&str>,
    ) -> Result<Page<Compartment>>;
}

/// A metric query against one compartment
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub compartment_id: String,
    pub namespace: String,
    /// Monitoring query language expression
    pub query: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub resolution: String,
}

/// Monitoring service
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// Run a metric query; each returned series holds the aggregated samples
    /// of one metric stream
    async fn summarize_metrics(&self, query: &MetricQuery) -> Result<Vec<MetricSeries>>;
}
