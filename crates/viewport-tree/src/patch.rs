//! The patch engine (C4, spec §4.4).

use crate::ids::{NodeId, SlotId};
use crate::node::Node;
use crate::props::Props;
use crate::tree::RenderTree;

/// `children_insert` payload: insert `node` at `index`, clamped to append if
/// `index` is beyond the end (spec §4.4 rule 4).
#[derive(Debug, Clone, PartialEq)]
pub struct ChildInsert {
	pub index: usize,
	pub node: Node,
}

/// `children_remove` payload: out-of-range `index` is a no-op (spec §4.4 rule 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildRemove {
	pub index: usize,
}

/// `children_move` payload: out-of-range on either side is a no-op (rule 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildMove {
	pub from: usize,
	pub to: usize,
}

/// One patch operation (spec §3, §4.4). Multiple fields may be set on a
/// single op; they apply in the fixed order documented on [`apply_batch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchOp {
	pub target: NodeId,
	pub remove: bool,
	pub replace: Option<Node>,
	pub set: Option<Props>,
	pub children_insert: Option<ChildInsert>,
	pub children_remove: Option<ChildRemove>,
	pub children_move: Option<ChildMove>,
	pub transition: Option<SlotId>,
}

impl PatchOp {
	/// A bare op with no fields set, for tests and builders.
	pub fn targeting(target: NodeId) -> Self {
		Self {
			target,
			..Default::default()
		}
	}
}

/// Outcome of applying one [`PatchOp`] batch (spec §4.4: "returns `(applied,
/// failed)` counts").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchBatchResult {
	pub applied: usize,
	pub failed: usize,
	/// Ids of nodes mutated by a successfully applied op, in application
	/// order; duplicates are possible if one batch touches the same id
	/// more than once. Consumed by the viewer's dirty-node tracking.
	pub touched: Vec<NodeId>,
}

/// Applies an ordered batch of patch ops (spec §4.4: "they apply
/// sequentially in order, each observing the effects of earlier ops in the
/// same batch"). Within a single op, fields apply in this fixed order:
///
/// 1. `remove` — delete the target subtree.
/// 2. `replace` — splice in a new subtree at the target's position.
/// 3. `set` — merge props, last-write-wins per key.
/// 4. `children_insert` — insert a child at a position (clamped to append).
/// 5. `children_remove` — remove a child at a position (no-op if out of range).
/// 6. `children_move` — reorder children (no-op if out of range).
/// 7. `transition` — a renderer hint only; no effect on the tree.
///
/// A missing `target` is a failure for the *whole* op (spec §4.4: "A
/// missing `target` id is a failure, not a fatal error"); the remaining
/// ops in the batch still apply.
pub fn apply_batch(tree: &mut RenderTree, ops: Vec<PatchOp>) -> PatchBatchResult {
	let mut result = PatchBatchResult::default();
	for op in ops {
		if apply_one(tree, op, &mut result.touched) {
			result.applied += 1;
		} else {
			result.failed += 1;
		}
	}
	result
}

fn apply_one(tree: &mut RenderTree, op: PatchOp, touched: &mut Vec<NodeId>) -> bool {
	let target = op.target;
	if !tree.contains(target) {
		return false;
	}

	if op.remove {
		tree.remove_subtree(target);
		touched.push(target);
		return true;
	}

	if let Some(new_subtree) = op.replace {
		let parent = tree.get(target).and_then(|r| r.parent);
		let position = parent.and_then(|p| tree.get(p).and_then(|r| r.children.iter().position(|c| *c == target)));
		let new_id = new_subtree.id;
		tree.remove_subtree(target);
		if tree.insert_subtree(new_subtree, parent).is_err() {
			// Duplicate id within the replacement subtree or against the
			// rest of the tree: the old subtree is already gone, so this
			// op still counts as applied (it did mutate the tree) but the
			// splice itself is abandoned without a parent link.
			touched.push(target);
			return true;
		}
		if let Some(parent_id) = parent {
			if let Some(parent_record) = tree.node_mut(parent_id) {
				let idx = position.unwrap_or(parent_record.children.len());
				let idx = idx.min(parent_record.children.len());
				parent_record.children.insert(idx, new_id);
			}
		} else {
			tree.set_root_unchecked(new_id);
		}
		touched.push(new_id);
		return true;
	}

	// From here `target` is still present; re-check since `replace`/`remove`
	// return early above.
	if !tree.contains(target) {
		return false;
	}

	if let Some(set) = &op.set {
		if let Some(record) = tree.node_mut(target) {
			record.props.merge_from(set);
			tree.bump_node_version(target);
		}
	}

	if let Some(insert) = op.children_insert {
		let built_id = insert.node.id;
		match tree.insert_subtree(insert.node, Some(target)) {
			Ok(()) => {
				if let Some(record) = tree.node_mut(target) {
					let idx = insert.index.min(record.children.len());
					record.children.insert(idx, built_id);
				}
			}
			Err(_) => { /* duplicate id: leave the batch's accounting as applied, tree unchanged for this field */ }
		}
	}

	if let Some(remove) = op.children_remove {
		if let Some(record) = tree.node_mut(target) {
			if remove.index < record.children.len() {
				let child_id = record.children[remove.index];
				record.children.remove(remove.index);
				tree.remove_subtree(child_id);
			}
		}
	}

	if let Some(mv) = op.children_move {
		if let Some(record) = tree.node_mut(target) {
			let len = record.children.len();
			if mv.from < len && mv.to < len {
				let id = record.children.remove(mv.from);
				record.children.insert(mv.to, id);
			}
		}
	}

	// `transition` is a renderer hint only; the core tree does not store it.

	touched.push(target);
	true
}
