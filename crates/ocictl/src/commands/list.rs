//! `ocictl list`

use comfy_table::Table;
use ocictl_core::instances::{list_compartments, list_instances};
use ocictl_core::{CompartmentEntry, Instance, LifecycleState};
use tracing::debug;

use super::format_state;
use crate::cli::{ListArgs, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::{OcictlError, Result as CliResult};
use crate::output::print_output;

pub async fn handle_list(
    conn_mgr: &ConnectionManager,
    args: &ListArgs,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    // Checked before connecting so a usage problem doesn't cost a probe
    let compartment_id = if args.list_compartments {
        None
    } else {
        Some(
            conn_mgr
                .compartment(args.compartment_id.as_deref())
                .ok_or_else(|| OcictlError::InvalidInput {
                    message: format!(
                        "--compartment-id is required (no default compartment for profile '{}')",
                        conn_mgr.profile_name()
                    ),
                })?,
        )
    };

    let session = conn_mgr.connect().await?;

    let Some(compartment_id) = compartment_id else {
        let entries = list_compartments(&session.client, &session.auth.tenancy_id).await?;
        return match output_format.structured(query) {
            Some(format) => Ok(print_output(&entries, format, query)?),
            None => {
                print_compartments(&entries);
                Ok(())
            }
        };
    };

    let state = args.state.map(LifecycleState::from);
    debug!(%compartment_id, ?state, "Listing instances");
    let instances = list_instances(&session.client, &compartment_id, state.as_ref()).await?;

    match output_format.structured(query) {
        Some(format) => print_output(&instances, format, query)?,
        None => print_instances(&instances, state.as_ref()),
    }
    Ok(())
}

fn print_compartments(entries: &[CompartmentEntry]) {
    let mut table = Table::new();
    table.set_header(vec!["Name", "OCID", "State", "Description"]);
    for entry in entries {
        let name = if entry.is_root {
            format!("{} (root)", entry.compartment.name)
        } else {
            entry.compartment.name.clone()
        };
        table.add_row(vec![
            name,
            entry.compartment.id.clone(),
            entry.compartment.lifecycle_state.clone(),
            entry.compartment.description.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
}

fn print_instances(instances: &[Instance], state: Option<&LifecycleState>) {
    if instances.is_empty() {
        match state {
            Some(state) => println!("No {} instances found", state),
            None => println!("No instances found"),
        }
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Name",
        "State",
        "Shape",
        "Availability Domain",
        "Created",
        "OCID",
    ]);
    for instance in instances {
        table.add_row(vec![
            instance.display_name.clone(),
            format_state(&instance.lifecycle_state),
            instance.shape.clone(),
            instance.availability_domain.clone(),
            instance
                .time_created
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            instance.id.clone(),
        ]);
    }
    println!("{}", table);
    println!("{} instance(s)", instances.len());
}
