//! The render tree store (C3, spec §3/§4.3).
//!
//! Rather than an owned subtree plus a side-table of borrowed references
//! (the `id -> &node` shape spec §9 sketches, which is self-referential and
//! needs `unsafe` to express safely), this store flattens the tree into a
//! single `id -> record` map where each record holds its children as ids.
//! The map *is* the index, so invariant I1 ("every node reachable from root
//! is present in the node index") holds by construction rather than needing
//! separate bookkeeping, and I4 (subtree removal removes the whole subtree
//! from the index) is one `remove` per descendant id.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::data::DataRow;
use crate::error::TreeError;
use crate::ids::{NodeId, SchemaId, SlotId};
use crate::node::{Node, NodeType};
use crate::props::Props;
use crate::schema::SchemaColumn;
use crate::slot::SlotValue;

/// A flattened, in-tree view of one node. Children are stored as ids so the
/// arena never owns more than one level of indirection.
#[derive(Debug, Clone)]
pub struct NodeRecord {
	pub node_type: NodeType,
	pub props: Props,
	pub children: Vec<NodeId>,
	pub text_alt: Option<String>,
	pub parent: Option<NodeId>,
}

/// Applies the per-key monotonic version gate (spec §4.3): drop updates
/// whose `seq` is strictly less than the stored version, except `seq == 0`
/// which is always applied and ungated.
fn version_gate<K: std::hash::Hash + Eq + Copy>(versions: &mut HashMap<K, u64>, key: K, seq: u64) -> bool {
	if seq == 0 {
		versions.insert(key, 0);
		return true;
	}
	match versions.get(&key) {
		Some(&stored) if stored > seq => false,
		_ => {
			versions.insert(key, seq);
			true
		}
	}
}

/// Append-path version gate: same `seq == 0` ungated rule as
/// [`version_gate`], but drops on `seq == stored` too, not just `seq <
/// stored`. DATA appends a row rather than overwriting a keyed value, so the
/// overwrite gate's "re-applying the same seq is harmless" reasoning doesn't
/// hold here — re-delivery of the same `(msg, seq)` would otherwise append a
/// duplicate row, which breaks P5's idempotence requirement for DATA.
fn append_gate<K: std::hash::Hash + Eq + Copy>(versions: &mut HashMap<K, u64>, key: K, seq: u64) -> bool {
	if seq == 0 {
		versions.insert(key, 0);
		return true;
	}
	match versions.get(&key) {
		Some(&stored) if stored >= seq => false,
		_ => {
			versions.insert(key, seq);
			true
		}
	}
}

/// The render tree plus its associated slot, schema, and data-row tables
/// (spec §3, "Render tree").
#[derive(Debug, Default)]
pub struct RenderTree {
	root: Option<NodeId>,
	nodes: IndexMap<NodeId, NodeRecord>,
	node_versions: HashMap<NodeId, u64>,
	tree_version: u64,

	slots: IndexMap<SlotId, SlotValue>,
	slot_versions: HashMap<SlotId, u64>,

	schemas: IndexMap<SchemaId, Vec<SchemaColumn>>,
	schema_versions: HashMap<SchemaId, u64>,

	data_rows: IndexMap<SchemaId, Vec<DataRow>>,
	data_versions: HashMap<SchemaId, u64>,
}

impl RenderTree {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn root_id(&self) -> Option<NodeId> {
		self.root
	}

	pub fn get(&self, id: NodeId) -> Option<&NodeRecord> {
		self.nodes.get(&id)
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	pub fn node_version(&self, id: NodeId) -> Option<u64> {
		self.node_versions.get(&id).copied()
	}

	pub fn slot(&self, id: SlotId) -> Option<&SlotValue> {
		self.slots.get(&id)
	}

	pub fn schema(&self, id: SchemaId) -> Option<&[SchemaColumn]> {
		self.schemas.get(&id).map(Vec::as_slice)
	}

	pub fn data_rows(&self, id: SchemaId) -> Option<&[DataRow]> {
		self.data_rows.get(&id).map(Vec::as_slice)
	}

	/// Sets the root id directly, used by the patch engine when a `replace`
	/// targets the current root (the new subtree has already been spliced
	/// into the node map by the caller).
	pub(crate) fn set_root_unchecked(&mut self, id: NodeId) {
		self.root = Some(id);
	}

	/// Replaces the whole tree (`SET_TREE`), under the global tree version
	/// gate. Returns `true` if applied, `false` if the update was stale and
	/// dropped (spec §4.7). `None` empties the tree.
	pub fn set_tree(&mut self, root: Option<Node>, seq: u64) -> Result<bool, TreeError> {
		if seq != 0 && self.tree_version > seq {
			return Ok(false);
		}
		self.tree_version = seq;

		self.nodes.clear();
		self.node_versions.clear();
		self.root = None;

		if let Some(root) = root {
			let id = root.id;
			self.insert_subtree(root, None)?;
			self.root = Some(id);
		}
		Ok(true)
	}

	/// Builds `node`'s whole subtree and links it in, rejecting the splice
	/// if any id within it is already present (§9 open question, resolved
	/// in favor of explicit rejection over silent overwrite).
	pub(crate) fn insert_subtree(&mut self, node: Node, parent: Option<NodeId>) -> Result<(), TreeError> {
		let mut ids = Vec::new();
		node.collect_ids(&mut ids);
		let mut seen = std::collections::HashSet::new();
		for id in &ids {
			if !seen.insert(*id) {
				return Err(TreeError::DuplicateWithinSubtree(*id));
			}
			if self.nodes.contains_key(id) {
				return Err(TreeError::DuplicateNodeId(*id));
			}
		}
		self.insert_subtree_unchecked(node, parent);
		Ok(())
	}

	fn insert_subtree_unchecked(&mut self, node: Node, parent: Option<NodeId>) {
		let Node {
			id,
			node_type,
			props,
			children,
			text_alt,
		} = node;
		let mut child_ids = Vec::with_capacity(children.len());
		for child in children {
			child_ids.push(child.id);
			self.insert_subtree_unchecked(child, Some(id));
		}
		self.nodes.insert(
			id,
			NodeRecord {
				node_type,
				props,
				children: child_ids,
				text_alt,
				parent,
			},
		);
		self.bump_node_version(id);
	}

	/// Removes `id` and its whole subtree from the index, unlinking it from
	/// its parent's child list (or clearing `root`). No-op if `id` is absent.
	pub(crate) fn remove_subtree(&mut self, id: NodeId) {
		let Some(record) = self.nodes.get(&id) else {
			return;
		};
		let parent = record.parent;
		self.remove_subtree_recursive(id);
		match parent {
			Some(parent_id) => {
				if let Some(parent_record) = self.nodes.get_mut(&parent_id) {
					parent_record.children.retain(|c| *c != id);
				}
			}
			None => {
				if self.root == Some(id) {
					self.root = None;
				}
			}
		}
	}

	fn remove_subtree_recursive(&mut self, id: NodeId) {
		if let Some(record) = self.nodes.shift_remove(&id) {
			self.node_versions.remove(&id);
			for child in record.children {
				self.remove_subtree_recursive(child);
			}
		}
	}

	pub(crate) fn bump_node_version(&mut self, id: NodeId) {
		let next = self.node_versions.get(&id).copied().unwrap_or(0) + 1;
		self.node_versions.insert(id, next);
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
		self.nodes.get_mut(&id)
	}

	/// Defines or updates a slot (`DEFINE`), under the per-slot version gate.
	pub fn define_slot(&mut self, id: SlotId, value: SlotValue, seq: u64) -> bool {
		if version_gate(&mut self.slot_versions, id, seq) {
			self.slots.insert(id, value);
			true
		} else {
			false
		}
	}

	/// Defines or updates a schema (`SCHEMA`), under the per-schema version gate.
	pub fn define_schema(&mut self, id: SchemaId, columns: Vec<SchemaColumn>, seq: u64) -> bool {
		if version_gate(&mut self.schema_versions, id, seq) {
			self.schemas.insert(id, columns);
			true
		} else {
			false
		}
	}

	/// Appends a data row (`DATA`) under `schema_id`, under the per-schema
	/// data version gate. Unknown schema ids are accepted (spec §8: "DATA
	/// with unknown schema id -> accepted; projection skips until schema
	/// arrives", I6). Uses [`append_gate`] rather than [`version_gate`]: a
	/// re-delivered `(msg, seq)` must not append a second copy of the same
	/// row (P5), so `seq == stored` is dropped here, not just `seq < stored`.
	pub fn append_data(&mut self, schema_id: SchemaId, row: DataRow, seq: u64) -> bool {
		if append_gate(&mut self.data_versions, schema_id, seq) {
			self.data_rows.entry(schema_id).or_default().push(row);
			true
		} else {
			false
		}
	}
}
