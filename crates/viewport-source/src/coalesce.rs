//! Pending-patch coalescing (spec §4.6): "for each incoming op, if a pending
//! op already targets the same id and neither is `remove`/`replace`, merge
//! `set` maps last-write-wins and concatenate child-list ops; a `remove` or
//! `replace` supersedes and discards all prior ops targeting that id."
//!
//! `PatchOp` itself carries at most one `children_insert`/`children_remove`/
//! `children_move` per value (spec §3), so "concatenate child-list ops"
//! needs a richer in-memory shape than the wire op — [`CoalescedPatch`] holds
//! a `Vec` per child-list kind and expands back to one or more wire
//! [`PatchOp`]s at flush time.

use indexmap::IndexMap;

use viewport_tree::{ChildInsert, ChildMove, ChildRemove, NodeId, Node, PatchOp, Props, SlotId};

/// The coalesced, in-memory form of every pending op targeting one node id.
#[derive(Debug, Clone, Default)]
pub struct CoalescedPatch {
	pub remove: bool,
	pub replace: Option<Node>,
	pub set: Option<Props>,
	pub children_insert: Vec<ChildInsert>,
	pub children_remove: Vec<ChildRemove>,
	pub children_move: Vec<ChildMove>,
	pub transition: Option<SlotId>,
}

impl CoalescedPatch {
	fn from_op(op: PatchOp) -> Self {
		Self {
			remove: op.remove,
			replace: op.replace,
			set: op.set,
			children_insert: op.children_insert.into_iter().collect(),
			children_remove: op.children_remove.into_iter().collect(),
			children_move: op.children_move.into_iter().collect(),
			transition: op.transition,
		}
	}
}

/// Coalesces `op` into `pending`, per target id, applying the rule above.
pub fn coalesce(pending: &mut IndexMap<NodeId, CoalescedPatch>, op: PatchOp) {
	let target = op.target;

	if op.remove || op.replace.is_some() {
		// Supersedes and discards all prior ops targeting this id.
		pending.insert(target, CoalescedPatch::from_op(op));
		return;
	}

	match pending.get_mut(&target) {
		Some(existing) if !existing.remove && existing.replace.is_none() => {
			if let Some(incoming_set) = op.set {
				existing.set.get_or_insert_with(Props::default).merge_from(&incoming_set);
			}
			existing.children_insert.extend(op.children_insert);
			existing.children_remove.extend(op.children_remove);
			existing.children_move.extend(op.children_move);
			if op.transition.is_some() {
				existing.transition = op.transition;
			}
		}
		// No pending op yet, or the existing one is a remove/replace that a
		// plain op can't sensibly merge into: start fresh.
		_ => {
			pending.insert(target, CoalescedPatch::from_op(op));
		}
	}
}

/// Expands one target's coalesced patch back into the smallest sequence of
/// wire [`PatchOp`]s that reproduces its effect, in the fixed field order
/// from spec §4.4 (remove, replace, set, children_insert, children_remove,
/// children_move). A single `PatchOp` can carry one of each child-list kind
/// simultaneously, so only the overflow beyond the first of each kind needs
/// its own extra op.
pub fn expand(target: NodeId, patch: CoalescedPatch) -> Vec<PatchOp> {
	if patch.remove {
		let mut op = PatchOp::targeting(target);
		op.remove = true;
		return vec![op];
	}
	if let Some(replace) = patch.replace {
		let mut op = PatchOp::targeting(target);
		op.replace = Some(replace);
		return vec![op];
	}

	let mut inserts = patch.children_insert.into_iter();
	let mut removes = patch.children_remove.into_iter();
	let mut moves = patch.children_move.into_iter();

	let mut first = PatchOp::targeting(target);
	first.set = patch.set;
	first.transition = patch.transition;
	first.children_insert = inserts.next();
	first.children_remove = removes.next();
	first.children_move = moves.next();

	let mut ops = Vec::new();
	if first.set.is_some()
		|| first.transition.is_some()
		|| first.children_insert.is_some()
		|| first.children_remove.is_some()
		|| first.children_move.is_some()
	{
		ops.push(first);
	}

	for node in inserts {
		let mut op = PatchOp::targeting(target);
		op.children_insert = Some(node);
		ops.push(op);
	}
	for remove in removes {
		let mut op = PatchOp::targeting(target);
		op.children_remove = Some(remove);
		ops.push(op);
	}
	for mv in moves {
		let mut op = PatchOp::targeting(target);
		op.children_move = Some(mv);
		ops.push(op);
	}

	ops
}

#[cfg(test)]
mod tests {
	use super::*;
	use viewport_tree::{NodeType};

	#[test]
	fn set_maps_merge_last_write_wins() {
		let mut pending = IndexMap::new();
		let id = NodeId(1);

		let mut first = PatchOp::targeting(id);
		let mut props_a = Props::default();
		props_a.opacity = Some(0.5);
		props_a.background = Some("red".to_string());
		first.set = Some(props_a);
		coalesce(&mut pending, first);

		let mut second = PatchOp::targeting(id);
		let mut props_b = Props::default();
		props_b.opacity = Some(0.9);
		second.set = Some(props_b);
		coalesce(&mut pending, second);

		let merged = pending.get(&id).unwrap().set.clone().unwrap();
		assert_eq!(merged.opacity, Some(0.9));
		assert_eq!(merged.background, Some("red".to_string()));
	}

	#[test]
	fn child_list_ops_concatenate() {
		let mut pending = IndexMap::new();
		let id = NodeId(1);

		let mut first = PatchOp::targeting(id);
		first.children_insert = Some(ChildInsert { index: 0, node: Node::new(NodeId(2), NodeType::Box) });
		coalesce(&mut pending, first);

		let mut second = PatchOp::targeting(id);
		second.children_insert = Some(ChildInsert { index: 1, node: Node::new(NodeId(3), NodeType::Box) });
		coalesce(&mut pending, second);

		assert_eq!(pending.get(&id).unwrap().children_insert.len(), 2);
	}

	#[test]
	fn remove_discards_prior_ops_for_same_target() {
		let mut pending = IndexMap::new();
		let id = NodeId(1);

		let mut set_op = PatchOp::targeting(id);
		set_op.set = Some(Props::default());
		coalesce(&mut pending, set_op);

		let mut remove_op = PatchOp::targeting(id);
		remove_op.remove = true;
		coalesce(&mut pending, remove_op);

		let patch = pending.get(&id).unwrap();
		assert!(patch.remove);
		assert!(patch.set.is_none());
	}

	#[test]
	fn expand_packs_set_and_first_child_op_together() {
		let mut patch = CoalescedPatch::default();
		let mut props = Props::default();
		props.opacity = Some(1.0);
		patch.set = Some(props);
		patch.children_insert = vec![
			ChildInsert { index: 0, node: Node::new(NodeId(2), NodeType::Box) },
			ChildInsert { index: 1, node: Node::new(NodeId(3), NodeType::Box) },
		];

		let ops = expand(NodeId(1), patch);
		assert_eq!(ops.len(), 2);
		assert!(ops[0].set.is_some());
		assert!(ops[0].children_insert.is_some());
		assert!(ops[1].set.is_none());
		assert!(ops[1].children_insert.is_some());
	}
}
