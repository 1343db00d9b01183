//! Scripted in-memory providers for tests
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for integration tests and dependent crates.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::error::{CoreError, Result};
use crate::model::{
    Compartment, Instance, InstanceAction, LifecycleState, MetricSample, MetricSeries, Page, User,
};
use crate::provider::{ComputeApi, IdentityApi, MetricQuery, MonitoringApi};

/// Build an instance with sensible defaults
pub fn instance(id: &str, name: &str, state: LifecycleState) -> Instance {
    Instance {
        id: id.to_string(),
        display_name: name.to_string(),
        lifecycle_state: state,
        compartment_id: "ocid1.compartment.oc1..test".to_string(),
        availability_domain: "Uocm:PHX-AD-1".to_string(),
        shape: "VM.Standard.E4.Flex".to_string(),
        region: "us-phoenix-1".to_string(),
        time_created: None,
    }
}

/// Build an active compartment
pub fn compartment(id: &str, name: &str, parent: Option<&str>) -> Compartment {
    Compartment {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        lifecycle_state: "ACTIVE".to_string(),
        compartment_id: parent.map(str::to_string),
    }
}

/// A series with one sample per minute starting at `start`
pub fn series(name: &str, start: DateTime<Utc>, values: &[Option<f64>]) -> MetricSeries {
    MetricSeries {
        name: name.to_string(),
        samples: values
            .iter()
            .enumerate()
            .map(|(i, value)| MetricSample {
                timestamp: start + ChronoDuration::minutes(i as i64),
                value: *value,
            })
            .collect(),
        ..Default::default()
    }
}

fn cursor_for(index: usize, total: usize) -> Option<String> {
    (index + 1 < total).then(|| format!("page-{}", index + 1))
}

fn page_index(page: Option<&str>) -> Result<usize> {
    match page {
        None => Ok(0),
        Some(cursor) => cursor
            .strip_prefix("page-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| CoreError::remote(format!("invalid page cursor {cursor}"))),
    }
}

/// Compute provider that replays a scripted sequence of lifecycle states
///
/// Every `get_instance` consumes the next state; the last one repeats once
/// the script runs out.
pub struct FakeCompute {
    states: Vec<LifecycleState>,
    display_name: Mutex<String>,
    instance_pages: Vec<Vec<Instance>>,
    action_error: Option<String>,
    get_error_at: Option<usize>,
    get_calls: AtomicUsize,
    list_calls: AtomicUsize,
    actions: Mutex<Vec<InstanceAction>>,
}

impl FakeCompute {
    pub fn new(states: Vec<LifecycleState>) -> Self {
        Self {
            states,
            display_name: Mutex::new("test-instance".to_string()),
            instance_pages: Vec::new(),
            action_error: None,
            get_error_at: None,
            get_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Pages returned by `list_instances`, in order
    pub fn with_instance_pages(mut self, pages: Vec<Vec<Instance>>) -> Self {
        self.instance_pages = pages;
        self
    }

    /// Make every `instance_action` fail with a remote error
    pub fn with_action_error(mut self, message: &str) -> Self {
        self.action_error = Some(message.to_string());
        self
    }

    /// Make the `n`th `get_instance` call (zero based) fail
    pub fn with_get_error_at(mut self, n: usize) -> Self {
        self.get_error_at = Some(n);
        self
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn action_calls(&self) -> usize {
        self.actions().len()
    }

    pub fn actions(&self) -> Vec<InstanceAction> {
        self.actions.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn current_name(&self) -> String {
        self.display_name
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    async fn get_instance(&self, instance_id: &str) -> Result<Instance> {
        let n = self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.get_error_at == Some(n) {
            return Err(CoreError::remote("ServiceUnavailable"));
        }
        let state = self
            .states
            .get(n)
            .or_else(|| self.states.last())
            .cloned()
            .ok_or_else(|| CoreError::remote("no scripted state"))?;
        Ok(instance(instance_id, &self.current_name(), state))
    }

    async fn instance_action(&self, _instance_id: &str, action: InstanceAction) -> Result<()> {
        if let Ok(mut actions) = self.actions.lock() {
            actions.push(action);
        }
        match &self.action_error {
            Some(message) => Err(CoreError::remote(message.clone())),
            None => Ok(()),
        }
    }

    async fn update_display_name(
        &self,
        instance_id: &str,
        display_name: &str,
    ) -> Result<Instance> {
        if let Ok(mut name) = self.display_name.lock() {
            *name = display_name.to_string();
        }
        let state = self
            .states
            .last()
            .cloned()
            .unwrap_or(LifecycleState::Running);
        Ok(instance(instance_id, display_name, state))
    }

    async fn list_instances(
        &self,
        _compartment_id: &str,
        state: Option<&LifecycleState>,
        page: Option<&str>,
    ) -> Result<Page<Instance>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let index = page_index(page)?;
        let items = self
            .instance_pages
            .get(index)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|i| state.is_none_or(|s| &i.lifecycle_state == s))
            .collect();
        Ok(Page::new(items, cursor_for(index, self.instance_pages.len())))
    }
}

/// Identity provider backed by maps
#[derive(Default)]
pub struct FakeIdentity {
    users: HashMap<String, User>,
    compartments: HashMap<String, Compartment>,
    compartment_pages: Vec<Vec<Compartment>>,
    fail_page_at: Option<usize>,
    user_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users.insert(
            id.to_string(),
            User {
                id: id.to_string(),
                name: name.to_string(),
                description: None,
            },
        );
        self
    }

    pub fn with_compartment(mut self, compartment: Compartment) -> Self {
        self.compartments.insert(compartment.id.clone(), compartment);
        self
    }

    pub fn with_compartment_pages(mut self, pages: Vec<Vec<Compartment>>) -> Self {
        self.compartment_pages = pages;
        self
    }

    /// Make the listing fail when page `n` (zero based) is requested
    pub fn with_failing_page(mut self, n: usize) -> Self {
        self.fail_page_at = Some(n);
        self
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| CoreError::remote("NotAuthenticated: user not found"))
    }

    async fn get_compartment(&self, compartment_id: &str) -> Result<Compartment> {
        self.compartments
            .get(compartment_id)
            .cloned()
            .ok_or_else(|| CoreError::remote(format!("NotAuthorizedOrNotFound: {compartment_id}")))
    }

    async fn list_compartments(
        &self,
        _parent_id: &str,
        page: Option<&str>,
    ) -> Result<Page<Compartment>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let index = page_index(page)?;
        if self.fail_page_at == Some(index) {
            return Err(CoreError::remote("InternalServerError"));
        }
        let items = self
            .compartment_pages
            .get(index)
            .cloned()
            .unwrap_or_default();
        Ok(Page::new(items, cursor_for(index, self.compartment_pages.len())))
    }
}

/// Monitoring provider answering by metric name
#[derive(Default)]
pub struct FakeMonitoring {
    series: HashMap<String, Vec<MetricSeries>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<MetricQuery>>,
}

impl FakeMonitoring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Series returned for queries on `metric`
    pub fn with_series(mut self, metric: &str, series: Vec<MetricSeries>) -> Self {
        self.series.insert(metric.to_string(), series);
        self
    }

    /// Queries on `metric` fail
    pub fn with_failure(mut self, metric: &str) -> Self {
        self.failing.insert(metric.to_string());
        self
    }

    /// Every query received so far
    pub fn queries(&self) -> Vec<MetricQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MonitoringApi for FakeMonitoring {
    async fn summarize_metrics(&self, query: &MetricQuery) -> Result<Vec<MetricSeries>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        let metric = query
            .query
            .split('[')
            .next()
            .unwrap_or_default()
            .to_string();
        if self.failing.contains(&metric) {
            return Err(CoreError::remote(format!("InvalidParameter: {metric}")));
        }
        Ok(self.series.get(&metric).cloned().unwrap_or_default())
    }
}
