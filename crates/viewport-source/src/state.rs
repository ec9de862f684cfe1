//! Source state (C6, spec §4.6): pending/published double buffer plus the
//! flush-to-messages logic.

use indexmap::IndexMap;

use viewport_tree::{DataRow, Node, NodeId, PatchOp, RenderTree, SchemaColumn, SchemaId, SlotId, SlotValue};
use viewport_wire::ProtocolMessage;

use crate::coalesce::{self, CoalescedPatch};
use crate::error::SourceError;

/// Holds a **pending** (not yet flushed) and **published** (last flushed)
/// mirror of a source-owned tree, plus a monotonic `seq` counter (spec
/// §4.6). `published` reuses [`RenderTree`] directly — it already tracks
/// nodes, slots, schemas, and data rows under the per-key version gate
/// (spec §4.3), which is exactly what a published mirror needs.
#[derive(Debug, Default)]
pub struct SourceState {
	published: RenderTree,
	seq: u64,

	tree_pending: bool,
	pending_root: Option<Node>,
	pending_patches: IndexMap<NodeId, CoalescedPatch>,
	pending_slots: IndexMap<SlotId, SlotValue>,
	pending_schemas: IndexMap<SchemaId, Vec<SchemaColumn>>,
	pending_data: Vec<(SchemaId, DataRow)>,
}

impl SourceState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Read-only access to the last-flushed (published) tree, for tests and
	/// introspecting what a newly-connected viewer would be caught up to.
	pub fn published(&self) -> &RenderTree {
		&self.published
	}

	/// `set_tree(vnode)`: pending tree ← `root`; clears pending patches
	/// (spec §4.6 — a full tree replace makes any in-flight patch moot).
	pub fn set_tree(&mut self, root: Option<Node>) {
		self.tree_pending = true;
		self.pending_root = root;
		self.pending_patches.clear();
	}

	/// `patch(ops)`: coalesces `ops` into the pending patch buffer, per
	/// target id (spec §4.6 coalescing rule, see [`crate::coalesce`]).
	pub fn patch(&mut self, ops: Vec<PatchOp>) {
		for op in ops {
			coalesce::coalesce(&mut self.pending_patches, op);
		}
	}

	/// `define_slot(id, value)`: pending slots\[id\] = value, last-write-wins.
	pub fn define_slot(&mut self, id: SlotId, value: SlotValue) {
		self.pending_slots.insert(id, value);
	}

	/// `define_schema(id, columns)`: pending schemas\[id\] = columns.
	pub fn define_schema(&mut self, id: SchemaId, columns: Vec<SchemaColumn>) {
		self.pending_schemas.insert(id, columns);
	}

	/// `emit_data(schema_id, row)`: appends to the pending data buffer.
	/// Unlike patches and slots, rows are never coalesced (spec §4.6).
	pub fn emit_data(&mut self, schema_id: SchemaId, row: DataRow) {
		self.pending_data.push((schema_id, row));
	}

	/// True if any pending buffer holds an unflushed change.
	pub fn has_pending(&self) -> bool {
		self.tree_pending
			|| !self.pending_patches.is_empty()
			|| !self.pending_slots.is_empty()
			|| !self.pending_schemas.is_empty()
			|| !self.pending_data.is_empty()
	}

	/// `flush()`: emits, in order, `SCHEMA` for each newly-defined or updated
	/// schema, `DEFINE` for each slot change, `TREE` (if a full tree was
	/// set) or `PATCH` with the coalesced ops, then `DATA` for each buffered
	/// row (spec §4.6). Each message gets its own `seq = ++state.seq`, and
	/// `published` is updated to mirror it immediately — so a later flush in
	/// the same call always observes an already-applied earlier one.
	pub fn flush(&mut self) -> Result<Vec<ProtocolMessage>, SourceError> {
		let mut messages = Vec::new();

		for (schema_id, columns) in self.pending_schemas.drain(..) {
			self.seq += 1;
			self.published.define_schema(schema_id, columns.clone(), self.seq);
			messages.push(ProtocolMessage::Schema { schema_id, columns });
		}

		for (slot_id, value) in self.pending_slots.drain(..) {
			self.seq += 1;
			self.published.define_slot(slot_id, value.clone(), self.seq);
			messages.push(ProtocolMessage::Define { slot_id, value });
		}

		if self.tree_pending {
			self.tree_pending = false;
			let root = self.pending_root.take();
			self.seq += 1;
			self.published.set_tree(root.clone(), self.seq)?;
			messages.push(ProtocolMessage::Tree { root });
		} else if !self.pending_patches.is_empty() {
			let mut ops = Vec::new();
			for (target, patch) in self.pending_patches.drain(..) {
				ops.extend(coalesce::expand(target, patch));
			}
			self.seq += 1;
			let result = viewport_tree::apply_batch(&mut self.published, ops.clone());
			tracing::debug!(applied = result.applied, failed = result.failed, seq = self.seq, "flushed coalesced patch batch");
			messages.push(ProtocolMessage::Patch { ops });
		}

		for (schema_id, row) in self.pending_data.drain(..) {
			self.seq += 1;
			self.published.append_data(schema_id, row.clone(), self.seq);
			messages.push(ProtocolMessage::Data { schema_id: Some(schema_id), row });
		}

		tracing::debug!(count = messages.len(), seq = self.seq, "flush produced messages");
		Ok(messages)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use viewport_tree::{ColumnType, NodeType, Props};

	fn data_row(value: &str) -> DataRow {
		DataRow(vec![viewport_tree::Cell::Str(value.to_string())])
	}

	#[test]
	fn flush_orders_schema_define_tree_data() {
		let mut state = SourceState::new();
		state.define_schema(
			SchemaId(1),
			vec![SchemaColumn { id: 0, name: "name".to_string(), column_type: ColumnType::String, unit: None, format: None }],
		);
		state.define_slot(SlotId(1), SlotValue::Color("#fff".to_string()));
		state.set_tree(Some(Node::new(NodeId(1), NodeType::Box)));
		state.emit_data(SchemaId(1), data_row("alice"));

		let messages = state.flush().unwrap();
		assert!(matches!(messages[0], ProtocolMessage::Schema { .. }));
		assert!(matches!(messages[1], ProtocolMessage::Define { .. }));
		assert!(matches!(messages[2], ProtocolMessage::Tree { .. }));
		assert!(matches!(messages[3], ProtocolMessage::Data { .. }));
		assert!(!state.has_pending());
	}

	#[test]
	fn flush_emits_patch_when_no_full_tree_was_set() {
		let mut state = SourceState::new();
		state.set_tree(Some(Node::new(NodeId(1), NodeType::Box)));
		state.flush().unwrap();

		let mut props = Props::default();
		props.opacity = Some(0.5);
		let mut op = PatchOp::targeting(NodeId(1));
		op.set = Some(props);
		state.patch(vec![op]);

		let messages = state.flush().unwrap();
		assert_eq!(messages.len(), 1);
		assert!(matches!(messages[0], ProtocolMessage::Patch { .. }));
		assert_eq!(state.published().get(NodeId(1)).unwrap().props.opacity, Some(0.5));
	}

	#[test]
	fn set_tree_clears_pending_patches() {
		let mut state = SourceState::new();
		state.patch(vec![PatchOp::targeting(NodeId(1))]);
		assert!(state.has_pending());
		state.set_tree(None);
		let messages = state.flush().unwrap();
		assert_eq!(messages.len(), 1);
		assert!(matches!(messages[0], ProtocolMessage::Tree { root: None }));
	}

	#[test]
	fn seq_is_monotonically_increasing_across_messages() {
		let mut state = SourceState::new();
		state.define_schema(SchemaId(1), vec![]);
		state.define_schema(SchemaId(2), vec![]);
		state.define_slot(SlotId(1), SlotValue::Color("#000".to_string()));
		state.flush().unwrap();
		assert_eq!(state.seq, 3);
	}

	#[test]
	fn has_pending_is_false_on_a_fresh_state() {
		assert!(!SourceState::new().has_pending());
	}
}
