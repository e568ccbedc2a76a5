//! Delta computation for partial updates.
//!
//! Given the desired model and the state last observed from the service,
//! keep only the mutable fields that actually changed. Unchanged fields
//! become `None` and are omitted from the update request, so a no-op update
//! never reaches the service.

use crate::model::ResourceModel;

/// Compare desired against observed state and keep only real changes.
///
/// Scalars compare by equality. `config_parameters`, `subnet_ids` and
/// `security_group_ids` are unordered collections and compare by membership,
/// so two lists with the same elements in different order produce no delta.
/// Tags are reconciled separately (see [`crate::tags`]) and pass through
/// untouched; the read-only detail blob is taken from the observed side.
pub fn compute_update_delta(desired: &ResourceModel, observed: &ResourceModel) -> ResourceModel {
    ResourceModel {
        workgroup_name: desired.workgroup_name.clone(),
        namespace_name: desired.namespace_name.clone(),
        base_capacity: scalar_delta(desired.base_capacity, observed.base_capacity),
        max_capacity: scalar_delta(desired.max_capacity, observed.max_capacity),
        enhanced_vpc_routing: scalar_delta(
            desired.enhanced_vpc_routing,
            observed.enhanced_vpc_routing,
        ),
        config_parameters: unordered_delta(
            desired.config_parameters.as_deref(),
            observed.config_parameters.as_deref(),
        ),
        publicly_accessible: scalar_delta(
            desired.publicly_accessible,
            observed.publicly_accessible,
        ),
        subnet_ids: unordered_delta(desired.subnet_ids.as_deref(), observed.subnet_ids.as_deref()),
        security_group_ids: unordered_delta(
            desired.security_group_ids.as_deref(),
            observed.security_group_ids.as_deref(),
        ),
        port: scalar_delta(desired.port, observed.port),
        tags: desired.tags.clone(),
        workgroup: observed.workgroup.clone(),
    }
}

/// True when the delta requests no attribute changes at all, in which case
/// the update call is skipped.
pub fn is_empty(delta: &ResourceModel) -> bool {
    delta.base_capacity.is_none()
        && delta.max_capacity.is_none()
        && delta.enhanced_vpc_routing.is_none()
        && delta.config_parameters.is_none()
        && delta.publicly_accessible.is_none()
        && delta.subnet_ids.is_none()
        && delta.security_group_ids.is_none()
        && delta.port.is_none()
}

fn scalar_delta<T: PartialEq>(desired: Option<T>, observed: Option<T>) -> Option<T> {
    if desired == observed { None } else { desired }
}

fn unordered_delta<T: Clone + Ord>(
    desired: Option<&[T]>,
    observed: Option<&[T]>,
) -> Option<Vec<T>> {
    match (desired, observed) {
        (Some(d), Some(o)) if unordered_eq(d, o) => None,
        (None, None) => None,
        _ => desired.map(<[T]>::to_vec),
    }
}

fn unordered_eq<T: Clone + Ord>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}
