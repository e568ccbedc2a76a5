//! Tag reconciliation for the update flow.
//!
//! The service exposes tagging as separate tag/untag calls, so an update
//! first diffs the desired tags against the tags currently on the resource
//! and then applies the two halves of the plan, removals before additions.

use std::collections::BTreeSet;

use crate::model::Tag;

/// The tag changes an update needs to apply. Either half may be empty, in
/// which case the corresponding API call is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReconciliation {
    /// Tags to create or overwrite via TagResource.
    pub to_apply: Vec<Tag>,
    /// Tag keys to remove via UntagResource.
    pub to_remove: Vec<String>,
}

impl TagReconciliation {
    pub fn is_noop(&self) -> bool {
        self.to_apply.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff desired tags against the tags currently applied to the resource.
///
/// Comparison is over whole key/value pairs: a changed value shows up as a
/// removal of the old pair's key followed by an application of the new pair,
/// matching the service's delete-then-create tagging sequence.
pub fn reconcile(desired: &[Tag], current: &[Tag]) -> TagReconciliation {
    let desired_pairs: BTreeSet<&Tag> = desired.iter().collect();
    let current_pairs: BTreeSet<&Tag> = current.iter().collect();

    let to_remove = current
        .iter()
        .filter(|tag| !desired_pairs.contains(tag))
        .map(|tag| tag.key.clone())
        .collect();

    let to_apply = desired
        .iter()
        .filter(|tag| !current_pairs.contains(tag))
        .cloned()
        .collect();

    TagReconciliation {
        to_apply,
        to_remove,
    }
}
