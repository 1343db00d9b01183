//! `ocictl update`: lifecycle actions, rename and status

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use ocictl_core::instances::{change_state, instance_status, rename_instance};
use ocictl_core::{
    Instance, InstanceAction, LifecycleState, ProgressCallback, ProgressEvent, Transition,
    TransitionSpec, TransitionWaiter,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{format_state, format_state_icon};
use crate::cli::{Operation, OutputFormat, UpdateArgs};
use crate::connection::ConnectionManager;
use crate::error::{OcictlError, Result as CliResult};
use crate::output::print_output;

/// Result of a lifecycle action as printed by `-o json|yaml|table`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionReport {
    pub instance_id: String,
    pub action: InstanceAction,
    pub target_state: LifecycleState,
    /// `already_in_state` when nothing was submitted
    pub outcome: &'static str,
    pub polls: u32,
    pub elapsed_secs: u64,
}

impl TransitionReport {
    pub fn new(instance_id: &str, action: InstanceAction, transition: &Transition) -> Self {
        let target_state = TransitionSpec::for_action(action).target;
        let (outcome, polls, elapsed) = match transition {
            Transition::AlreadyInState(_) => ("already_in_state", 0, Duration::ZERO),
            Transition::Completed { polls, elapsed } => ("completed", *polls, *elapsed),
        };
        Self {
            instance_id: instance_id.to_string(),
            action,
            target_state,
            outcome,
            polls,
            elapsed_secs: elapsed.as_secs(),
        }
    }

    fn summary_line(&self) -> String {
        if self.outcome == "already_in_state" {
            format!(
                "Instance {} is already {}",
                self.instance_id,
                format_state(&self.target_state)
            )
        } else {
            format!(
                "Instance {} is {} ({} poll(s), {}s)",
                self.instance_id,
                format_state(&self.target_state),
                self.polls,
                self.elapsed_secs
            )
        }
    }
}

pub async fn handle_update(
    conn_mgr: &ConnectionManager,
    args: &UpdateArgs,
    output_format: OutputFormat,
    query: Option<&str>,
    cancel: CancellationToken,
) -> CliResult<()> {
    let operation = args.operation();
    if let Operation::Rename(name) = &operation
        && name.trim().is_empty()
    {
        return Err(OcictlError::InvalidInput {
            message: "--rename needs a non-empty name".to_string(),
        });
    }

    let session = conn_mgr.connect().await?;
    let instance_id = args.instance_id.as_str();

    match operation {
        Operation::Status => {
            let instance = instance_status(&session.client, instance_id).await?;
            match output_format.structured(query) {
                Some(format) => print_output(&instance, format, query)?,
                None => print_instance(&instance),
            }
        }
        Operation::Rename(name) => {
            let renamed = rename_instance(&session.client, instance_id, &name).await?;
            match output_format.structured(query) {
                Some(format) => print_output(&renamed, format, query)?,
                None => println!(
                    "Renamed instance {} from '{}' to '{}'",
                    instance_id, renamed.old_name, renamed.instance.display_name
                ),
            }
        }
        Operation::Transition(action) => {
            let options = conn_mgr.wait_options(args.wait);
            let pb = spinner(instance_id, action);
            let waiter = TransitionWaiter::new(&session.client)
                .with_cancellation(cancel)
                .with_progress(progress_callback(pb.clone()));

            let result = change_state(&waiter, instance_id, action, &options).await;
            if !pb.is_finished() {
                pb.finish_and_clear();
            }

            let report = TransitionReport::new(instance_id, action, &result?);
            match output_format.structured(query) {
                Some(format) => print_output(&report, format, query)?,
                None => println!("{}", report.summary_line()),
            }
        }
    }
    Ok(())
}

fn spinner(instance_id: &str, action: InstanceAction) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Checking {} before {}", instance_id, action));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Spinner updates for each transition event
fn progress_callback(pb: ProgressBar) -> ProgressCallback {
    Box::new(move |event: ProgressEvent| match &event {
        ProgressEvent::Started {
            instance_id,
            action,
        } => {
            pb.set_message(format!("{} accepted for {}", action, instance_id));
        }
        ProgressEvent::Settling { delay } => {
            pb.set_message(format!("Waiting {}s for the action to take effect", delay.as_secs()));
        }
        ProgressEvent::Polling {
            instance_id,
            state,
            poll,
            ..
        } => {
            pb.set_message(format!(
                "{}: {} (check {})",
                instance_id,
                format_state_icon(state),
                poll
            ));
        }
        ProgressEvent::Completed { instance_id, state } => {
            pb.finish_with_message(format!("{}: {}", instance_id, format_state_icon(state)));
        }
        ProgressEvent::Failed { instance_id, error } => {
            pb.finish_with_message(format!("{} failed: {}", instance_id, error));
        }
    })
}

fn print_instance(instance: &Instance) {
    println!("Name:                {}", instance.display_name);
    println!("State:               {}", format_state(&instance.lifecycle_state));
    println!("OCID:                {}", instance.id);
    println!("Shape:               {}", instance.shape);
    println!("Availability domain: {}", instance.availability_domain);
    println!("Region:              {}", instance.region);
    if let Some(created) = instance.time_created {
        println!("Created:             {}", created.to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_completed_start() {
        let report = TransitionReport::new(
            "ocid1.instance.oc1..a",
            InstanceAction::Start,
            &Transition::Completed {
                polls: 3,
                elapsed: Duration::from_secs(10),
            },
        );
        assert_eq!(report.target_state, LifecycleState::Running);
        assert_eq!(report.outcome, "completed");
        assert_eq!(report.polls, 3);
        assert_eq!(report.elapsed_secs, 10);
    }

    #[test]
    fn test_report_for_no_op_stop() {
        let report = TransitionReport::new(
            "ocid1.instance.oc1..a",
            InstanceAction::Stop,
            &Transition::AlreadyInState(LifecycleState::Stopped),
        );
        assert_eq!(report.outcome, "already_in_state");
        assert_eq!(report.polls, 0);

        colored::control::set_override(false);
        assert_eq!(
            report.summary_line(),
            "Instance ocid1.instance.oc1..a is already STOPPED"
        );
    }

    #[test]
    fn test_report_serializes_provider_spellings() {
        let report = TransitionReport::new(
            "ocid1.instance.oc1..a",
            InstanceAction::SoftReset,
            &Transition::Completed {
                polls: 1,
                elapsed: Duration::ZERO,
            },
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["action"], "SOFTRESET");
        assert_eq!(value["target_state"], "RUNNING");
    }
}
