//! `ProtocolMessage`: the decoded shape of one CBOR payload (spec §4.2, §15).

use viewport_tree::{DataRow, Node, PatchOp, SchemaColumn, SchemaId, SlotId, SlotValue};

use crate::header::MessageType;
use crate::input::{EnvInfo, InputEvent};

/// The CBOR array's leading integer (spec §4.2 table). Distinct from the
/// frame header's [`MessageType`] byte — see that type's doc comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum Opcode {
	Set = 0,
	Del = 1,
	Patch = 2,
	Tree = 3,
	Data = 4,
	Schema = 5,
	Input = 6,
	Env = 7,
}

impl Opcode {
	pub fn from_i64(v: i64) -> Option<Self> {
		Some(match v {
			0 => Opcode::Set,
			1 => Opcode::Del,
			2 => Opcode::Patch,
			3 => Opcode::Tree,
			4 => Opcode::Data,
			5 => Opcode::Schema,
			6 => Opcode::Input,
			7 => Opcode::Env,
			_ => return None,
		})
	}
}

/// One fully-decoded message payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolMessage {
	/// `DEFINE`: opcode `SET`.
	Define { slot_id: SlotId, value: SlotValue },
	/// Reserved; never emitted by this crate, decoded for forward compatibility.
	Del { slot_id: SlotId },
	Patch { ops: Vec<PatchOp> },
	Tree { root: Option<Node> },
	Data { schema_id: Option<SchemaId>, row: DataRow },
	Schema { schema_id: SchemaId, columns: Vec<SchemaColumn> },
	Input { event: InputEvent },
	Env { info: EnvInfo },
	/// `REGION`/`AUDIO`/`CANVAS` (message type bytes 0x07-0x09): no CBOR
	/// opcode is defined for these (spec §9: "treat as opaque
	/// pass-through"), so the raw frame payload is carried unchanged.
	Opaque { message_type: MessageType, payload: Vec<u8> },
}

impl ProtocolMessage {
	/// The frame header [`MessageType`] this message is carried under.
	pub fn message_type(&self) -> MessageType {
		match self {
			ProtocolMessage::Define { .. } => MessageType::Define,
			ProtocolMessage::Del { .. } => MessageType::Define,
			ProtocolMessage::Patch { .. } => MessageType::Patch,
			ProtocolMessage::Tree { .. } => MessageType::Tree,
			ProtocolMessage::Data { .. } => MessageType::Data,
			ProtocolMessage::Schema { .. } => MessageType::Schema,
			ProtocolMessage::Input { .. } => MessageType::Input,
			ProtocolMessage::Env { .. } => MessageType::Env,
			ProtocolMessage::Opaque { message_type, .. } => *message_type,
		}
	}
}
