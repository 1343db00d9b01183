//! `ocictl monitor`

use colored::Colorize;
use comfy_table::Table;
use ocictl_core::{Lookback, MetricSummary, MonitorReport, monitor_instance};

use super::format_state;
use crate::cli::{MonitorArgs, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::print_output;

const AGENT_DOCS_URL: &str =
    "https://docs.oracle.com/en-us/iaas/Content/Compute/Tasks/manage-plugins.htm";

pub async fn handle_monitor(
    conn_mgr: &ConnectionManager,
    args: &MonitorArgs,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let lookback = Lookback::minutes(args.minutes)?;
    let session = conn_mgr.connect().await?;

    let report = monitor_instance(
        &session.client,
        &session.client,
        &args.instance_id,
        &args.compartment_id,
        lookback,
    )
    .await?;

    match output_format.structured(query) {
        Some(format) => print_output(&report, format, query)?,
        None => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &MonitorReport) {
    println!("Instance: {} ({})", report.display_name, report.instance_id);
    println!("State:    {}", format_state(&report.lifecycle_state));
    println!(
        "Window:   last {} minute(s), {} to {}",
        report.lookback_minutes,
        report.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
        report.end_time.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !report.instance_running() {
        println!();
        println!(
            "{} the instance is not running; metrics may be unavailable",
            "warning:".yellow().bold()
        );
    }

    println!();
    println!("{}", metrics_table(&report.metrics));

    if !report.has_data() {
        println!();
        println!(
            "{} no CPU or memory samples in this window",
            "warning:".yellow().bold()
        );
        println!("  Check that the Compute Instance Monitoring plugin is enabled:");
        println!("  {}", AGENT_DOCS_URL);
    }
}

fn metrics_table(metrics: &[MetricSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Average", "Minimum", "Maximum", "Samples"]);
    for m in metrics {
        let row = if m.unavailable {
            vec![
                m.metric.to_string(),
                "unavailable".to_string(),
                String::new(),
                String::new(),
                String::new(),
            ]
        } else if m.summary.is_empty() {
            vec![
                m.metric.to_string(),
                "no data".to_string(),
                String::new(),
                String::new(),
                "0".to_string(),
            ]
        } else {
            vec![
                m.metric.to_string(),
                format_amount(m.summary.avg, m.unit),
                format_amount(m.summary.min, m.unit),
                format_amount(m.summary.max, m.unit),
                m.summary.count.to_string(),
            ]
        };
        table.add_row(row);
    }
    table
}

fn format_amount(value: f64, unit: &str) -> String {
    if unit == "%" {
        format!("{:.2}%", value)
    } else {
        format!("{:.2} {}", value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocictl_core::{MetricKind, Summary};

    fn summary(metric: MetricKind, values: &[Option<f64>], unavailable: bool) -> MetricSummary {
        MetricSummary {
            metric,
            unit: metric.unit(),
            summary: Summary::from_values(values.iter().copied()),
            unavailable,
        }
    }

    #[test]
    fn test_amount_units() {
        assert_eq!(format_amount(12.345, "%"), "12.35%");
        assert_eq!(format_amount(1024.0, "bytes/s"), "1024.00 bytes/s");
    }

    #[test]
    fn test_table_marks_missing_metrics() {
        let table = metrics_table(&[
            summary(MetricKind::CpuUtilization, &[Some(10.0), Some(30.0)], false),
            summary(MetricKind::MemoryUtilization, &[], false),
            summary(MetricKind::DiskBytesRead, &[], true),
        ])
        .to_string();

        assert!(table.contains("20.00%"));
        assert!(table.contains("no data"));
        assert!(table.contains("unavailable"));
    }
}
