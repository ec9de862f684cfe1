//! Viewer state (C7, spec §4.7): applies inbound messages to a render tree
//! under the version discipline of §4.3, and accumulates a [`DirtySet`] a
//! renderer can drain at its own cadence.

use viewport_tree::RenderTree;
use viewport_wire::{EnvInfo, ProtocolMessage};

use crate::dirty::DirtySet;
use crate::error::ViewerError;

/// Holds the render tree plus its slot/schema/data tables (via
/// [`RenderTree`], which already enforces the per-key version gate of spec
/// §4.3), the latest [`EnvInfo`] reported by the viewer's environment, and
/// the accumulated [`DirtySet`] since the last [`ViewerState::consume_dirty`].
#[derive(Debug, Default)]
pub struct ViewerState {
	tree: RenderTree,
	dirty: DirtySet,
	env: Option<EnvInfo>,
}

impl ViewerState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Read-only access to the render tree, for a renderer to traverse once
	/// it observes a non-empty [`DirtySet`].
	pub fn tree(&self) -> &RenderTree {
		&self.tree
	}

	/// The most recently applied `ENV` message, if any.
	pub fn env(&self) -> Option<&EnvInfo> {
		self.env.as_ref()
	}

	/// Dispatches one decoded message against the tree (spec §4.7):
	///
	/// - `DEFINE` → versioned slot store; marks `slots`.
	/// - `TREE` → versioned tree rebuild; sets `tree_replaced` (which
	///   supersedes any pending per-node marks, spec §9).
	/// - `PATCH` → delegates to the patch engine (C4); marks each
	///   successfully touched node.
	/// - `SCHEMA` → versioned store; marks `schemas`.
	/// - `DATA` → versioned append; marks `data`. A `None` schema id can't
	///   be stored (the store is keyed by schema id) and is dropped with a
	///   warning, same as any other rejected update.
	/// - `INPUT` → appended to `inputs` (viewer→source replay/testing use,
	///   spec §4.7).
	/// - `ENV` → updates `env`; no dirty flag (spec §4.7: "no dirty flag").
	/// - `Del` (reserved opcode 1) and `Opaque` (REGION/AUDIO/CANVAS) → no
	///   tree effect; logged and otherwise ignored (spec §9: "treat as
	///   opaque pass-through").
	pub fn apply_message(&mut self, msg: ProtocolMessage, seq: u64) -> Result<(), ViewerError> {
		match msg {
			ProtocolMessage::Define { slot_id, value } => {
				if self.tree.define_slot(slot_id, value, seq) {
					self.dirty.slots.insert(slot_id);
				} else {
					tracing::warn!(slot_id = slot_id.0, seq, "stale DEFINE dropped by version gate");
				}
			}
			ProtocolMessage::Tree { root } => {
				if self.tree.set_tree(root, seq)? {
					self.dirty.mark_tree_replaced();
				} else {
					tracing::warn!(seq, "stale TREE dropped by version gate");
				}
			}
			ProtocolMessage::Patch { ops } => {
				let result = viewport_tree::apply_batch(&mut self.tree, ops);
				if result.failed > 0 {
					tracing::warn!(applied = result.applied, failed = result.failed, "patch batch had missing targets");
				}
				self.dirty.nodes.extend(result.touched);
			}
			ProtocolMessage::Schema { schema_id, columns } => {
				if self.tree.define_schema(schema_id, columns, seq) {
					self.dirty.schemas.insert(schema_id);
				} else {
					tracing::warn!(schema_id = schema_id.0, seq, "stale SCHEMA dropped by version gate");
				}
			}
			ProtocolMessage::Data { schema_id, row } => match schema_id {
				Some(schema_id) => {
					if self.tree.append_data(schema_id, row, seq) {
						self.dirty.data.insert(schema_id);
					} else {
						tracing::warn!(schema_id = schema_id.0, seq, "stale DATA dropped by version gate");
					}
				}
				None => tracing::warn!(seq, "DATA with no schema id cannot be stored; dropped"),
			},
			ProtocolMessage::Input { event } => self.dirty.inputs.push(event),
			ProtocolMessage::Env { info } => self.env = Some(info),
			ProtocolMessage::Del { slot_id } => {
				tracing::debug!(slot_id = slot_id.0, "reserved DEL opcode received; no-op");
			}
			ProtocolMessage::Opaque { message_type, payload } => {
				tracing::debug!(?message_type, len = payload.len(), "opaque message passed through untouched");
			}
		}
		Ok(())
	}

	/// Returns the dirty set accumulated since the last call and atomically
	/// installs an empty one (spec §4.7). A renderer polling this at its
	/// own cadence sees missed intervening mutations collapse into one
	/// coarser diff rather than observing every intermediate state.
	pub fn consume_dirty(&mut self) -> DirtySet {
		std::mem::take(&mut self.dirty)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use viewport_tree::{Node, NodeId, NodeType, PatchOp, Props, SchemaColumn, SchemaId, SlotId, SlotValue};

	#[test]
	fn define_marks_the_slot_dirty() {
		let mut viewer = ViewerState::new();
		viewer.apply_message(ProtocolMessage::Define { slot_id: SlotId(5), value: SlotValue::Color("red".into()) }, 1).unwrap();
		let dirty = viewer.consume_dirty();
		assert!(dirty.slots.contains(&SlotId(5)));
		assert!(dirty.dirty());
	}

	/// Spec §8 scenario 4: version gate.
	#[test]
	fn stale_define_is_dropped_and_not_marked_dirty() {
		let mut viewer = ViewerState::new();
		viewer.apply_message(ProtocolMessage::Define { slot_id: SlotId(5), value: SlotValue::Color("red".into()) }, 10).unwrap();
		viewer.consume_dirty();
		viewer.apply_message(ProtocolMessage::Define { slot_id: SlotId(5), value: SlotValue::Color("blue".into()) }, 5).unwrap();
		let dirty = viewer.consume_dirty();
		assert!(!dirty.dirty());
		assert_eq!(viewer.tree().slot(SlotId(5)), Some(&SlotValue::Color("red".into())));
	}

	#[test]
	fn tree_replace_supersedes_pending_node_marks() {
		let mut viewer = ViewerState::new();
		viewer.apply_message(ProtocolMessage::Tree { root: Some(Node::new(NodeId(1), NodeType::Box)) }, 1).unwrap();
		viewer.consume_dirty();

		let mut props = Props::default();
		props.opacity = Some(0.3);
		let mut op = PatchOp::targeting(NodeId(1));
		op.set = Some(props);
		viewer.apply_message(ProtocolMessage::Patch { ops: vec![op] }, 0).unwrap();

		viewer
			.apply_message(ProtocolMessage::Tree { root: Some(Node::new(NodeId(2), NodeType::Text)) }, 2)
			.unwrap();

		let dirty = viewer.consume_dirty();
		assert!(dirty.tree_replaced);
		assert!(dirty.nodes.is_empty());
	}

	#[test]
	fn patch_marks_touched_nodes_and_counts_failures_without_erroring() {
		let mut viewer = ViewerState::new();
		viewer.apply_message(ProtocolMessage::Tree { root: Some(Node::new(NodeId(1), NodeType::Box)) }, 1).unwrap();
		viewer.consume_dirty();

		let ops = vec![PatchOp::targeting(NodeId(1)), PatchOp::targeting(NodeId(999))];
		viewer.apply_message(ProtocolMessage::Patch { ops }, 0).unwrap();
		let dirty = viewer.consume_dirty();
		assert!(dirty.nodes.contains(&NodeId(1)));
		assert!(!dirty.nodes.contains(&NodeId(999)));
	}

	#[test]
	fn schema_and_data_mark_their_respective_sets() {
		let mut viewer = ViewerState::new();
		viewer
			.apply_message(
				ProtocolMessage::Schema {
					schema_id: SchemaId(7),
					columns: vec![SchemaColumn { id: 0, name: "name".into(), column_type: viewport_tree::ColumnType::String, unit: None, format: None }],
				},
				1,
			)
			.unwrap();
		viewer
			.apply_message(
				ProtocolMessage::Data { schema_id: Some(SchemaId(7)), row: viewport_tree::DataRow(vec![viewport_tree::Cell::Str("a".into())]) },
				2,
			)
			.unwrap();
		let dirty = viewer.consume_dirty();
		assert!(dirty.schemas.contains(&SchemaId(7)));
		assert!(dirty.data.contains(&SchemaId(7)));
	}

	#[test]
	fn data_with_unknown_schema_id_is_dropped_without_erroring() {
		let mut viewer = ViewerState::new();
		viewer
			.apply_message(ProtocolMessage::Data { schema_id: None, row: viewport_tree::DataRow(vec![]) }, 1)
			.unwrap();
		assert!(!viewer.consume_dirty().dirty());
	}

	#[test]
	fn env_updates_with_no_dirty_flag() {
		let mut viewer = ViewerState::new();
		viewer
			.apply_message(ProtocolMessage::Env { info: EnvInfo { remote: Some(true), ..Default::default() } }, 0)
			.unwrap();
		assert!(!viewer.consume_dirty().dirty());
		assert_eq!(viewer.env().unwrap().remote, Some(true));
	}

	#[test]
	fn input_events_are_collected_for_replay() {
		let mut viewer = ViewerState::new();
		viewer
			.apply_message(ProtocolMessage::Input { event: viewport_wire::InputEvent { target: Some(NodeId(1)), ..Default::default() } }, 0)
			.unwrap();
		let dirty = viewer.consume_dirty();
		assert_eq!(dirty.inputs.len(), 1);
	}

	#[test]
	fn consume_dirty_installs_an_empty_set() {
		let mut viewer = ViewerState::new();
		viewer.apply_message(ProtocolMessage::Define { slot_id: SlotId(1), value: SlotValue::Color("x".into()) }, 1).unwrap();
		let first = viewer.consume_dirty();
		assert!(first.dirty());
		let second = viewer.consume_dirty();
		assert!(!second.dirty());
	}
}
