//! Property tests for P1 (index coverage) and P2 (id uniqueness), spec §8.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::node::{Node, NodeType};
use crate::patch::{ChildInsert, ChildRemove, PatchOp, apply_batch};
use crate::tree::RenderTree;
use crate::NodeId;

/// Every id stored in the tree must be reachable from the root by walking
/// `children` (P1), and no id may appear twice in that walk (P2, trivially
/// true for a map key but checked here against the *reachable* set too, to
/// catch any orphaned record a bug might leave behind).
fn assert_index_coverage(tree: &RenderTree) {
	let mut reachable = HashSet::new();
	let mut stack = Vec::new();
	if let Some(root) = tree.root_id() {
		stack.push(root);
	}
	while let Some(id) = stack.pop() {
		assert!(tree.contains(id), "id {id} reachable from root but missing from index");
		assert!(reachable.insert(id), "id {id} reachable twice: cycle or duplicate");
		for child in &tree.get(id).unwrap().children {
			stack.push(*child);
		}
	}
}

#[derive(Debug, Clone)]
enum Op {
	InsertChild { parent: u32, new_id: u32, index: usize },
	RemoveChild { parent: u32, index: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
	prop_oneof![
		(1u32..6, 6u32..50, 0usize..4).prop_map(|(parent, new_id, index)| Op::InsertChild { parent, new_id, index }),
		(1u32..6, 0usize..4).prop_map(|(parent, index)| Op::RemoveChild { parent, index }),
	]
}

proptest! {
	#[test]
	fn index_coverage_holds_after_arbitrary_ops(ops in prop::collection::vec(op_strategy(), 0..40)) {
		let mut tree = RenderTree::new();
		tree.set_tree(Some(Node::new(NodeId(1), NodeType::Box)), 1).unwrap();
		let mut used_ids: HashSet<u32> = [1].into_iter().collect();

		for op in ops {
			match op {
				Op::InsertChild { parent, new_id, index } => {
					if used_ids.contains(&new_id) {
						continue;
					}
					let mut patch = PatchOp::targeting(NodeId(parent));
					patch.children_insert = Some(ChildInsert { index, node: Node::new(NodeId(new_id), NodeType::Text) });
					apply_batch(&mut tree, vec![patch]);
					used_ids.insert(new_id);
				}
				Op::RemoveChild { parent, index } => {
					let mut patch = PatchOp::targeting(NodeId(parent));
					patch.children_remove = Some(ChildRemove { index });
					apply_batch(&mut tree, vec![patch]);
				}
			}
			assert_index_coverage(&tree);
		}
	}
}
