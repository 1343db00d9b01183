//! Argument vectors for `oci` invocations
//!
//! Pure functions so the exact command lines can be unit tested. Global
//! options (`--output`, `--profile`, `--config-file`) are added by the
//! caller.

use chrono::SecondsFormat;

use crate::model::{InstanceAction, LifecycleState};
use crate::provider::MetricQuery;

pub fn get_instance(instance_id: &str) -> Vec<String> {
    args(&["compute", "instance", "get", "--instance-id", instance_id])
}

pub fn instance_action(instance_id: &str, action: InstanceAction) -> Vec<String> {
    args(&[
        "compute",
        "instance",
        "action",
        "--instance-id",
        instance_id,
        "--action",
        action.as_str(),
    ])
}

pub fn update_display_name(instance_id: &str, display_name: &str) -> Vec<String> {
    args(&[
        "compute",
        "instance",
        "update",
        "--instance-id",
        instance_id,
        "--display-name",
        display_name,
        "--force",
    ])
}

pub fn list_instances(
    compartment_id: &str,
    state: Option<&LifecycleState>,
    page: Option<&str>,
) -> Vec<String> {
    let mut out = args(&[
        "compute",
        "instance",
        "list",
        "--compartment-id",
        compartment_id,
    ]);
    if let Some(state) = state {
        out.extend(args(&["--lifecycle-state", state.as_str()]));
    }
    push_page(&mut out, page);
    out
}

pub fn get_user(user_id: &str) -> Vec<String> {
    args(&["iam", "user", "get", "--user-id", user_id])
}

pub fn get_compartment(compartment_id: &str) -> Vec<String> {
    args(&[
        "iam",
        "compartment",
        "get",
        "--compartment-id",
        compartment_id,
    ])
}

pub fn list_compartments(parent_id: &str, page: Option<&str>) -> Vec<String> {
    let mut out = args(&[
        "iam",
        "compartment",
        "list",
        "--compartment-id",
        parent_id,
        "--compartment-id-in-subtree",
        "true",
    ]);
    push_page(&mut out, page);
    out
}

pub fn summarize_metrics(query: &MetricQuery) -> Vec<String> {
    let start = query.start_time.to_rfc3339_opts(SecondsFormat::Secs, true);
    let end = query.end_time.to_rfc3339_opts(SecondsFormat::Secs, true);
    args(&[
        "monitoring",
        "metric-data",
        "summarize-metrics-data",
        "--compartment-id",
        &query.compartment_id,
        "--namespace",
        &query.namespace,
        "--query-text",
        &query.query,
        "--start-time",
        &start,
        "--end-time",
        &end,
        "--resolution",
        &query.resolution,
    ])
}

fn push_page(out: &mut Vec<String>, page: Option<&str>) {
    if let Some(page) = page {
        out.extend(args(&["--page", page]));
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_action_args() {
        assert_eq!(
            instance_action("ocid1.instance.oc1..a", InstanceAction::SoftReset).join(" "),
            "compute instance action --instance-id ocid1.instance.oc1..a --action SOFTRESET"
        );
    }

    #[test]
    fn test_list_instances_args() {
        assert_eq!(
            list_instances("ocid1.compartment.oc1..c", None, None).join(" "),
            "compute instance list --compartment-id ocid1.compartment.oc1..c"
        );
        assert_eq!(
            list_instances(
                "ocid1.compartment.oc1..c",
                Some(&LifecycleState::Stopped),
                Some("AAAA==")
            )
            .join(" "),
            "compute instance list --compartment-id ocid1.compartment.oc1..c \
             --lifecycle-state STOPPED --page AAAA=="
        );
    }

    #[test]
    fn test_list_compartments_args() {
        assert_eq!(
            list_compartments("ocid1.tenancy.oc1..t", Some("next")).join(" "),
            "iam compartment list --compartment-id ocid1.tenancy.oc1..t \
             --compartment-id-in-subtree true --page next"
        );
    }

    #[test]
    fn test_display_name_is_one_argument() {
        let out = update_display_name("ocid1.instance.oc1..a", "web server 01");
        assert!(out.contains(&"web server 01".to_string()));
    }

    #[test]
    fn test_summarize_metrics_args() {
        let query = MetricQuery {
            compartment_id: "ocid1.compartment.oc1..c".to_string(),
            namespace: "oci_computeagent".to_string(),
            query: "CpuUtilization[1m].mean(){resourceId = \"x\"}".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            resolution: "1m".to_string(),
        };
        let out = summarize_metrics(&query);
        let pos = |flag: &str| out.iter().position(|a| a == flag).unwrap();

        assert_eq!(out[pos("--query-text") + 1], query.query);
        assert_eq!(out[pos("--start-time") + 1], "2024-01-15T09:00:00Z");
        assert_eq!(out[pos("--end-time") + 1], "2024-01-15T10:00:00Z");
        assert_eq!(out[pos("--resolution") + 1], "1m");
    }
}
