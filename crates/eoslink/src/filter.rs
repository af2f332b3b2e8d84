//! Reply-filter negotiation: the pure diff engine.
//!
//! The console sends every reply category we subscribe to and nothing else.
//! Changing the enabled target set therefore means computing which wire
//! filter strings to add and which to remove, as one symmetric difference.
//! There is no acknowledgement for filter changes; the caller updates its
//! active set the moment the messages are sent.

use std::collections::BTreeSet;

use crate::message::REPLY_PREFIX;
use crate::target::RecordTarget;

/// Baseline filters every session needs regardless of targets: version
/// queries, heartbeat replies, and filter-change echoes.
pub const SYSTEM_FILTERS: &[&str] = &["/get/version", "/ping", "/filter/add", "/filter/remove"];

/// A relative filter address as it appears in a filter add/remove request:
/// prefixed with the console's reply address space.
pub fn wire_filter(relative: &str) -> String {
    format!("{REPLY_PREFIX}{relative}")
}

/// The wire filter strings for one target.
pub fn wire_filters(target: RecordTarget) -> impl Iterator<Item = String> {
    target.filters().iter().map(|f| wire_filter(f))
}

/// Filter strings to add and remove when moving between two target sets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterChanges {
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl FilterChanges {
    /// Symmetric difference of the per-target filter strings between the
    /// `from` and `to` target sets.
    pub fn between(from: &BTreeSet<RecordTarget>, to: &BTreeSet<RecordTarget>) -> Self {
        let mut changes = FilterChanges::default();
        for target in to.difference(from) {
            changes.add.extend(wire_filters(*target));
        }
        for target in from.difference(to) {
            changes.remove.extend(wire_filters(*target));
        }
        // A filter wanted by a surviving target never goes on the remove side.
        let kept: BTreeSet<String> = to.iter().flat_map(|t| wire_filters(*t)).collect();
        changes.remove.retain(|f| !kept.contains(f));
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}
