//! Instance monitoring
//!
//! Pulls the compute agent metrics of one instance over a lookback window
//! and reduces each metric to a [`Summary`].

use std::fmt;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::model::LifecycleState;
use crate::provider::{ComputeApi, MetricQuery, MonitoringApi};
use crate::stats::{Summary, summarize};

/// Metric namespace published by the compute instance agent
pub const COMPUTE_AGENT_NAMESPACE: &str = "oci_computeagent";

/// Aggregation interval of every query
pub const RESOLUTION: &str = "1m";

/// Metrics collected for an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetricKind {
    CpuUtilization,
    MemoryUtilization,
    DiskBytesRead,
    DiskBytesWritten,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::CpuUtilization,
        MetricKind::MemoryUtilization,
        MetricKind::DiskBytesRead,
        MetricKind::DiskBytesWritten,
    ];

    pub fn metric_name(&self) -> &'static str {
        match self {
            MetricKind::CpuUtilization => "CpuUtilization",
            MetricKind::MemoryUtilization => "MemoryUtilization",
            MetricKind::DiskBytesRead => "DiskBytesRead",
            MetricKind::DiskBytesWritten => "DiskBytesWritten",
        }
    }

    /// Utilization metrics are averaged, byte counters are turned into rates
    fn statistic(&self) -> &'static str {
        match self {
            MetricKind::CpuUtilization | MetricKind::MemoryUtilization => "mean",
            MetricKind::DiskBytesRead | MetricKind::DiskBytesWritten => "rate",
        }
    }

    /// Unit of the summarized values
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::CpuUtilization | MetricKind::MemoryUtilization => "%",
            MetricKind::DiskBytesRead | MetricKind::DiskBytesWritten => "bytes/s",
        }
    }

    /// Query text for this metric on one instance
    pub fn query_for(&self, instance_id: &str) -> String {
        format!(
            "{}[{}].{}(){{resourceId = \"{}\"}}",
            self.metric_name(),
            RESOLUTION,
            self.statistic(),
            instance_id
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric_name())
    }
}

/// Length of the monitoring window in minutes, at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Lookback(u32);

impl Lookback {
    pub fn minutes(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(CoreError::Validation(
                "lookback must be at least 1 minute".to_string(),
            ));
        }
        Ok(Lookback(minutes))
    }

    pub fn as_minutes(&self) -> u32 {
        self.0
    }

    /// `[end - lookback, end]`
    pub fn window_ending(&self, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (end - ChronoDuration::minutes(i64::from(self.0)), end)
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback(60)
    }
}

/// Summary of one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric: MetricKind,
    pub unit: &'static str,
    #[serde(flatten)]
    pub summary: Summary,
    /// The query failed; the summary is empty
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unavailable: bool,
}

/// Outcome of monitoring one instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorReport {
    pub instance_id: String,
    pub display_name: String,
    pub lifecycle_state: LifecycleState,
    pub lookback_minutes: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub metrics: Vec<MetricSummary>,
}

impl MonitorReport {
    /// Metrics are only published while the instance runs
    pub fn instance_running(&self) -> bool {
        self.lifecycle_state == LifecycleState::Running
    }

    pub fn get(&self, metric: MetricKind) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    /// False when neither CPU nor memory produced a single sample, which
    /// usually means the monitoring agent isn't installed
    pub fn has_data(&self) -> bool {
        [MetricKind::CpuUtilization, MetricKind::MemoryUtilization]
            .iter()
            .filter_map(|kind| self.get(*kind))
            .any(|m| !m.summary.is_empty())
    }
}

/// Fetch the instance and summarize its metrics over `[now - lookback, now]`
///
/// A failure to read the instance aborts. A failed metric query is logged
/// and reported as an unavailable, empty summary so the remaining metrics
/// still come through.
pub async fn monitor_instance(
    compute: &dyn ComputeApi,
    monitoring: &dyn MonitoringApi,
    instance_id: &str,
    compartment_id: &str,
    lookback: Lookback,
) -> Result<MonitorReport> {
    monitor_instance_at(
        compute,
        monitoring,
        instance_id,
        compartment_id,
        lookback,
        Utc::now(),
    )
    .await
}

/// [`monitor_instance`] with an explicit window end
pub async fn monitor_instance_at(
    compute: &dyn ComputeApi,
    monitoring: &dyn MonitoringApi,
    instance_id: &str,
    compartment_id: &str,
    lookback: Lookback,
    end: DateTime<Utc>,
) -> Result<MonitorReport> {
    let instance = compute.get_instance(instance_id).await?;
    if instance.lifecycle_state != LifecycleState::Running {
        warn!(
            instance_id,
            state = %instance.lifecycle_state,
            "Instance is not running; metrics may be unavailable"
        );
    }

    let (start_time, end_time) = lookback.window_ending(end);
    let mut metrics = Vec::with_capacity(MetricKind::ALL.len());

    for kind in MetricKind::ALL {
        let query = MetricQuery {
            compartment_id: compartment_id.to_string(),
            namespace: COMPUTE_AGENT_NAMESPACE.to_string(),
            query: kind.query_for(instance_id),
            start_time,
            end_time,
            resolution: RESOLUTION.to_string(),
        };

        let (summary, unavailable) = match monitoring.summarize_metrics(&query).await {
            Ok(series) => (summarize(&series), false),
            Err(e) => {
                warn!(instance_id, metric = %kind, error = %e, "Metric query failed");
                (Summary::default(), true)
            }
        };
        debug!(instance_id, metric = %kind, count = summary.count, "Metric summarized");

        metrics.push(MetricSummary {
            metric: kind,
            unit: kind.unit(),
            summary,
            unavailable,
        });
    }

    Ok(MonitorReport {
        instance_id: instance.id,
        display_name: instance.display_name,
        lifecycle_state: instance.lifecycle_state,
        lookback_minutes: lookback.as_minutes(),
        start_time,
        end_time,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_text() {
        assert_eq!(
            MetricKind::CpuUtilization.query_for("ocid1.instance.oc1..aaaa"),
            "CpuUtilization[1m].mean(){resourceId = \"ocid1.instance.oc1..aaaa\"}"
        );
        assert_eq!(
            MetricKind::DiskBytesWritten.query_for("ocid1.instance.oc1..aaaa"),
            "DiskBytesWritten[1m].rate(){resourceId = \"ocid1.instance.oc1..aaaa\"}"
        );
    }

    #[test]
    fn test_lookback_validation() {
        assert!(matches!(
            Lookback::minutes(0),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(Lookback::minutes(1).unwrap().as_minutes(), 1);
        assert_eq!(Lookback::default().as_minutes(), 60);
    }

    #[test]
    fn test_window() {
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let (start, stop) = Lookback::minutes(90).unwrap().window_ending(end);
        assert_eq!(stop, end);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }
}
