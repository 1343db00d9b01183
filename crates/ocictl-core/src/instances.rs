//! Instance and compartment operations behind the `list` and `update` commands

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::model::{Compartment, Instance, InstanceAction, LifecycleState};
use crate::pager::Paginator;
use crate::provider::{ComputeApi, IdentityApi};
use crate::waiter::{Transition, TransitionSpec, TransitionWaiter, WaitOptions};

/// Every instance in `compartment_id`, optionally only those in `state`
///
/// The state filter is applied by the provider.
pub async fn list_instances(
    compute: &dyn ComputeApi,
    compartment_id: &str,
    state: Option<&LifecycleState>,
) -> Result<Vec<Instance>> {
    debug!(compartment_id, state = ?state, "Listing instances");
    let paginator = Paginator::new(|page: Option<String>| async move {
        compute
            .list_instances(compartment_id, state, page.as_deref())
            .await
    });
    let instances = paginator.collect().await?;
    info!(compartment_id, count = instances.len(), "Listed instances");
    Ok(instances)
}

/// A compartment together with its place in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompartmentEntry {
    #[serde(flatten)]
    pub compartment: Compartment,
    pub is_root: bool,
}

/// The tenancy's root compartment followed by every compartment below it
pub async fn list_compartments(
    identity: &dyn IdentityApi,
    tenancy_id: &str,
) -> Result<Vec<CompartmentEntry>> {
    let root = identity.get_compartment(tenancy_id).await?;

    let paginator = Paginator::new(|page: Option<String>| async move {
        identity.list_compartments(tenancy_id, page.as_deref()).await
    });
    let children = paginator.collect().await?;
    debug!(tenancy_id, count = children.len(), "Listed compartments");

    let mut entries = Vec::with_capacity(children.len() + 1);
    entries.push(CompartmentEntry {
        compartment: root,
        is_root: true,
    });
    entries.extend(children.into_iter().map(|compartment| CompartmentEntry {
        compartment,
        is_root: false,
    }));
    Ok(entries)
}

/// Result of a rename
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Renamed {
    pub old_name: String,
    pub instance: Instance,
}

/// Change the display name of an instance
pub async fn rename_instance(
    compute: &dyn ComputeApi,
    instance_id: &str,
    new_name: &str,
) -> Result<Renamed> {
    if new_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "display name must not be empty".to_string(),
        ));
    }

    let current = compute.get_instance(instance_id).await?;
    let instance = compute.update_display_name(instance_id, new_name).await?;
    info!(
        instance_id,
        old_name = %current.display_name,
        new_name = %instance.display_name,
        "Instance renamed"
    );

    Ok(Renamed {
        old_name: current.display_name,
        instance,
    })
}

/// Current view of an instance
pub async fn instance_status(compute: &dyn ComputeApi, instance_id: &str) -> Result<Instance> {
    compute.get_instance(instance_id).await
}

/// Run one lifecycle action to completion
pub async fn change_state(
    waiter: &TransitionWaiter<'_>,
    instance_id: &str,
    action: InstanceAction,
    options: &WaitOptions,
) -> Result<Transition> {
    waiter
        .run(instance_id, &TransitionSpec::for_action(action), options)
        .await
}
