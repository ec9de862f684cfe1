//! The dirty set (C7, spec §4.7): what changed since the last
//! `consume_dirty()`, consumable by an external renderer at its own cadence.

use std::collections::HashSet;

use viewport_tree::{NodeId, SchemaId, SlotId};
use viewport_wire::InputEvent;

/// Records of what changed in a [`crate::state::ViewerState`] since the last
/// `consume_dirty()` call (spec §4.7). `tree_replaced` supersedes
/// node-level marks (spec §9: "node-level version numbers from before the
/// TREE are lost" — the same applies to per-node dirty marks, since a full
/// tree replace makes enumerating individually-touched nodes meaningless).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySet {
	pub tree_replaced: bool,
	pub nodes: HashSet<NodeId>,
	pub slots: HashSet<SlotId>,
	pub schemas: HashSet<SchemaId>,
	pub data: HashSet<SchemaId>,
	pub inputs: Vec<InputEvent>,
}

impl DirtySet {
	/// True iff any sub-field is non-empty or `tree_replaced` is set (spec
	/// §4.7: "The dirty set's `dirty` property is true iff any sub-field is
	/// non-empty or `tree_replaced` is set").
	pub fn dirty(&self) -> bool {
		self.tree_replaced || !self.nodes.is_empty() || !self.slots.is_empty() || !self.schemas.is_empty() || !self.data.is_empty() || !self.inputs.is_empty()
	}

	pub(crate) fn mark_tree_replaced(&mut self) {
		self.tree_replaced = true;
		self.nodes.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fresh_set_is_not_dirty() {
		assert!(!DirtySet::default().dirty());
	}

	#[test]
	fn any_nonempty_field_makes_it_dirty() {
		let mut d = DirtySet::default();
		d.nodes.insert(NodeId(1));
		assert!(d.dirty());
	}

	#[test]
	fn tree_replaced_alone_makes_it_dirty() {
		let mut d = DirtySet::default();
		d.tree_replaced = true;
		assert!(d.dirty());
	}

	#[test]
	fn mark_tree_replaced_clears_node_marks() {
		let mut d = DirtySet::default();
		d.nodes.insert(NodeId(1));
		d.mark_tree_replaced();
		assert!(d.tree_replaced);
		assert!(d.nodes.is_empty());
	}
}
