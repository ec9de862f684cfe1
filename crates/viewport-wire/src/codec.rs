//! The CBOR payload codec (C2, spec §4.2): `ProtocolMessage` <-> bytes.

use ciborium::Value as Cbor;

use viewport_tree::{Cell, DataRow, NodeId, PatchOp, SchemaColumn, SchemaId, SlotId, SlotValue};

use crate::error::PayloadError;
use crate::header::MessageType;
use crate::input::{EnvInfo, InputEvent, InputKind};
use crate::keys::{EnvKey, InputKey, PatchKey, SchemaKey};
use crate::message::{Opcode, ProtocolMessage};
use crate::props_conv::{cbor_to_node, entries_to_props, node_to_cbor, props_to_entries};
use crate::value_conv::{cbor_to_value, value_to_cbor};

fn as_map(v: &Cbor) -> Result<&[(Cbor, Cbor)], PayloadError> {
	match v {
		Cbor::Map(entries) => Ok(entries.as_slice()),
		_ => Err(PayloadError::Malformed("expected a map".into())),
	}
}

fn find_int<'a>(entries: &'a [(Cbor, Cbor)], key: i64) -> Option<&'a Cbor> {
	entries.iter().find_map(|(k, v)| match k {
		Cbor::Integer(i) if i64::try_from(*i) == Ok(key) => Some(v),
		_ => None,
	})
}

fn find_str<'a>(entries: &'a [(Cbor, Cbor)], key: &str) -> Option<&'a Cbor> {
	entries.iter().find_map(|(k, v)| match k {
		Cbor::Text(s) if s == key => Some(v),
		_ => None,
	})
}

fn as_i64(v: &Cbor) -> Option<i64> {
	match v {
		Cbor::Integer(i) => i64::try_from(*i).ok(),
		_ => None,
	}
}

fn as_u32(v: &Cbor) -> Option<u32> {
	as_i64(v).and_then(|i| u32::try_from(i).ok())
}

fn as_u64(v: &Cbor) -> Option<u64> {
	match v {
		Cbor::Integer(i) => u64::try_from(*i).ok(),
		_ => None,
	}
}

fn as_f64(v: &Cbor) -> Option<f64> {
	match v {
		Cbor::Float(f) => Some(*f),
		Cbor::Integer(i) => i64::try_from(*i).ok().map(|x| x as f64),
		_ => None,
	}
}

fn as_str(v: &Cbor) -> Option<&str> {
	match v {
		Cbor::Text(s) => Some(s.as_str()),
		_ => None,
	}
}

fn as_bool(v: &Cbor) -> Option<bool> {
	match v {
		Cbor::Bool(b) => Some(*b),
		_ => None,
	}
}

// --- schema columns -------------------------------------------------------

fn column_type_str(t: viewport_tree::ColumnType) -> &'static str {
	use viewport_tree::ColumnType::*;
	match t {
		String => "string",
		Uint64 => "uint64",
		Int64 => "int64",
		Float64 => "float64",
		Bool => "bool",
		Timestamp => "timestamp",
	}
}

fn column_type_from_str(s: &str) -> Option<viewport_tree::ColumnType> {
	use viewport_tree::ColumnType::*;
	Some(match s {
		"string" => String,
		"uint64" => Uint64,
		"int64" => Int64,
		"float64" => Float64,
		"bool" => Bool,
		"timestamp" => Timestamp,
		_ => return None,
	})
}

fn column_format_to_cbor(f: &viewport_tree::ColumnFormat) -> Cbor {
	use viewport_tree::ColumnFormat::*;
	Cbor::Text(
		match f {
			HumanBytes => "human_bytes".to_string(),
			RelativeTime => "relative_time".to_string(),
			Other(s) => s.clone(),
		},
	)
}

fn column_format_from_str(s: &str) -> viewport_tree::ColumnFormat {
	use viewport_tree::ColumnFormat::*;
	match s {
		"human_bytes" => HumanBytes,
		"relative_time" => RelativeTime,
		other => Other(other.to_string()),
	}
}

fn schema_column_to_cbor(col: &SchemaColumn) -> Cbor {
	let mut entries = vec![
		(Cbor::Integer((SchemaKey::Id as i64).into()), Cbor::Integer((col.id as i64).into())),
		(Cbor::Integer((SchemaKey::Name as i64).into()), Cbor::Text(col.name.clone())),
		(Cbor::Integer((SchemaKey::Type as i64).into()), Cbor::Text(column_type_str(col.column_type).to_string())),
	];
	if let Some(unit) = &col.unit {
		entries.push((Cbor::Integer((SchemaKey::Unit as i64).into()), Cbor::Text(unit.clone())));
	}
	if let Some(format) = &col.format {
		entries.push((Cbor::Integer((SchemaKey::Format as i64).into()), column_format_to_cbor(format)));
	}
	Cbor::Map(entries)
}

fn cbor_to_schema_column(v: &Cbor) -> Result<SchemaColumn, PayloadError> {
	let entries = as_map(v)?;
	let id = find_int(entries, SchemaKey::Id as i64)
		.and_then(as_u32)
		.ok_or_else(|| PayloadError::Malformed("schema column missing id".into()))?;
	let name = find_int(entries, SchemaKey::Name as i64)
		.and_then(as_str)
		.ok_or_else(|| PayloadError::Malformed("schema column missing name".into()))?
		.to_string();
	let column_type = find_int(entries, SchemaKey::Type as i64)
		.and_then(as_str)
		.and_then(column_type_from_str)
		.ok_or_else(|| PayloadError::Malformed("schema column missing or unrecognized type".into()))?;
	let unit = find_int(entries, SchemaKey::Unit as i64).and_then(as_str).map(str::to_string);
	let format = find_int(entries, SchemaKey::Format as i64).and_then(as_str).map(column_format_from_str);
	Ok(SchemaColumn { id, name, column_type, unit, format })
}

// --- data cells ------------------------------------------------------------

fn cell_to_cbor(cell: &Cell) -> Cbor {
	let (tag, value) = match cell {
		Cell::Str(s) => (0, Cbor::Text(s.clone())),
		Cell::U64(v) => (1, Cbor::Integer((*v).into())),
		Cell::I64(v) => (2, Cbor::Integer((*v).into())),
		Cell::F64(v) => (3, Cbor::Float(*v)),
		Cell::Bool(v) => (4, Cbor::Bool(*v)),
		Cell::Timestamp(v) => (5, Cbor::Integer((*v).into())),
	};
	Cbor::Array(vec![Cbor::Integer(tag.into()), value])
}

fn cbor_to_cell(v: &Cbor) -> Result<Cell, PayloadError> {
	let Cbor::Array(items) = v else {
		return Err(PayloadError::Malformed("cell is not a tagged array".into()));
	};
	let [tag, value] = items.as_slice() else {
		return Err(PayloadError::Malformed("cell array must have exactly 2 elements".into()));
	};
	let tag = as_i64(tag).ok_or_else(|| PayloadError::Malformed("cell tag is not an integer".into()))?;
	Ok(match tag {
		0 => Cell::Str(as_str(value).unwrap_or_default().to_string()),
		1 => Cell::U64(as_u64(value).unwrap_or_default()),
		2 => Cell::I64(as_i64(value).unwrap_or_default()),
		3 => Cell::F64(as_f64(value).unwrap_or_default()),
		4 => Cell::Bool(as_bool(value).unwrap_or_default()),
		5 => Cell::Timestamp(as_i64(value).unwrap_or_default()),
		other => return Err(PayloadError::Malformed(format!("unknown cell tag {other}"))),
	})
}

// --- slot values -------------------------------------------------------

fn slot_value_to_cbor(value: &SlotValue) -> Cbor {
	let mut entries = vec![(Cbor::Integer(0i64.into()), Cbor::Text(value.kind().to_string()))];
	match value {
		SlotValue::Style(props) => entries.extend(props_to_entries(props)),
		SlotValue::Color(color) => entries.push((Cbor::Text("value".to_string()), Cbor::Text(color.clone()))),
		SlotValue::Keybind { key, action } => {
			entries.push((Cbor::Text("key".to_string()), Cbor::Text(key.clone())));
			entries.push((Cbor::Text("action".to_string()), Cbor::Text(action.clone())));
		}
		SlotValue::Transition { duration_ms, easing } => {
			entries.push((Cbor::Text("duration_ms".to_string()), Cbor::Integer((*duration_ms).into())));
			entries.push((Cbor::Text("easing".to_string()), Cbor::Text(easing.clone())));
		}
		SlotValue::TextSize(size) => entries.push((Cbor::Text("value".to_string()), Cbor::Float(*size))),
		SlotValue::Schema(id) => entries.push((Cbor::Text("schema".to_string()), Cbor::Integer((id.0 as i64).into()))),
		SlotValue::RowTemplate { schema } => {
			entries.push((Cbor::Text("schema".to_string()), Cbor::Integer((schema.0 as i64).into())))
		}
		SlotValue::Other { fields, .. } => {
			for (k, v) in fields {
				entries.push((Cbor::Text(k.clone()), value_to_cbor(v)));
			}
		}
	}
	Cbor::Map(entries)
}

fn cbor_to_slot_value(v: &Cbor) -> Result<SlotValue, PayloadError> {
	let entries = as_map(v)?;
	let kind = find_int(entries, 0)
		.and_then(as_str)
		.ok_or_else(|| PayloadError::Malformed("slot value missing kind".into()))?;
	Ok(match kind {
		"style" => SlotValue::Style(entries_to_props(entries)),
		"color" => SlotValue::Color(
			find_str(entries, "value")
				.and_then(as_str)
				.ok_or_else(|| PayloadError::Malformed("color slot missing value".into()))?
				.to_string(),
		),
		"keybind" => SlotValue::Keybind {
			key: find_str(entries, "key").and_then(as_str).unwrap_or_default().to_string(),
			action: find_str(entries, "action").and_then(as_str).unwrap_or_default().to_string(),
		},
		"transition" => SlotValue::Transition {
			duration_ms: find_str(entries, "duration_ms").and_then(as_u64).unwrap_or_default(),
			easing: find_str(entries, "easing").and_then(as_str).unwrap_or_default().to_string(),
		},
		"text_size" => SlotValue::TextSize(find_str(entries, "value").and_then(as_f64).unwrap_or_default()),
		"schema" => SlotValue::Schema(viewport_tree::SchemaId(
			find_str(entries, "schema")
				.and_then(as_u32)
				.ok_or_else(|| PayloadError::Malformed("schema slot missing schema id".into()))?,
		)),
		"row_template" => SlotValue::RowTemplate {
			schema: viewport_tree::SchemaId(
				find_str(entries, "schema")
					.and_then(as_u32)
					.ok_or_else(|| PayloadError::Malformed("row_template slot missing schema id".into()))?,
			),
		},
		other => {
			let mut fields = indexmap::IndexMap::new();
			for (k, v) in entries {
				if let Cbor::Text(key) = k {
					if key != "kind" {
						fields.insert(key.clone(), cbor_to_value(v));
					}
				}
			}
			SlotValue::Other { kind: other.to_string(), fields }
		}
	})
}

// --- patch ops -----------------------------------------------------------

fn patch_op_to_cbor(op: &PatchOp) -> Cbor {
	let mut entries = vec![(Cbor::Integer((PatchKey::Target as i64).into()), Cbor::Integer((op.target.0 as i64).into()))];
	if op.remove {
		entries.push((Cbor::Integer((PatchKey::Remove as i64).into()), Cbor::Bool(true)));
	}
	if let Some(replace) = &op.replace {
		entries.push((Cbor::Integer((PatchKey::Replace as i64).into()), node_to_cbor(replace)));
	}
	if let Some(set) = &op.set {
		entries.push((Cbor::Integer((PatchKey::Set as i64).into()), Cbor::Map(props_to_entries(set))));
	}
	if let Some(insert) = &op.children_insert {
		entries.push((
			Cbor::Integer((PatchKey::ChildrenInsert as i64).into()),
			Cbor::Map(vec![
				(Cbor::Integer((PatchKey::Index as i64).into()), Cbor::Integer((insert.index as i64).into())),
				(Cbor::Integer((PatchKey::Node as i64).into()), node_to_cbor(&insert.node)),
			]),
		));
	}
	if let Some(remove) = &op.children_remove {
		entries.push((
			Cbor::Integer((PatchKey::ChildrenRemove as i64).into()),
			Cbor::Map(vec![(Cbor::Integer((PatchKey::Index as i64).into()), Cbor::Integer((remove.index as i64).into()))]),
		));
	}
	if let Some(mv) = &op.children_move {
		entries.push((
			Cbor::Integer((PatchKey::ChildrenMove as i64).into()),
			Cbor::Map(vec![
				(Cbor::Integer((PatchKey::From as i64).into()), Cbor::Integer((mv.from as i64).into())),
				(Cbor::Integer((PatchKey::To as i64).into()), Cbor::Integer((mv.to as i64).into())),
			]),
		));
	}
	if let Some(transition) = op.transition {
		entries.push((Cbor::Integer((PatchKey::Transition as i64).into()), Cbor::Integer((transition.0 as i64).into())));
	}
	Cbor::Map(entries)
}

fn cbor_to_patch_op(v: &Cbor) -> Result<PatchOp, PayloadError> {
	let entries = as_map(v)?;
	let target = find_int(entries, PatchKey::Target as i64)
		.and_then(as_u32)
		.ok_or_else(|| PayloadError::Malformed("patch op missing target".into()))?;
	let mut op = PatchOp::targeting(NodeId(target));
	op.remove = find_int(entries, PatchKey::Remove as i64).and_then(as_bool).unwrap_or(false);
	if let Some(replace) = find_int(entries, PatchKey::Replace as i64) {
		op.replace = Some(cbor_to_node(replace)?);
	}
	if let Some(set) = find_int(entries, PatchKey::Set as i64) {
		let set_entries = as_map(set)?;
		op.set = Some(entries_to_props(set_entries));
	}
	if let Some(insert) = find_int(entries, PatchKey::ChildrenInsert as i64) {
		let insert_entries = as_map(insert)?;
		let index = find_int(insert_entries, PatchKey::Index as i64).and_then(as_u32).unwrap_or(0) as usize;
		let node = find_int(insert_entries, PatchKey::Node as i64)
			.ok_or_else(|| PayloadError::Malformed("children_insert missing node".into()))?;
		op.children_insert = Some(viewport_tree::ChildInsert { index, node: cbor_to_node(node)? });
	}
	if let Some(remove) = find_int(entries, PatchKey::ChildrenRemove as i64) {
		let remove_entries = as_map(remove)?;
		let index = find_int(remove_entries, PatchKey::Index as i64).and_then(as_u32).unwrap_or(0) as usize;
		op.children_remove = Some(viewport_tree::ChildRemove { index });
	}
	if let Some(mv) = find_int(entries, PatchKey::ChildrenMove as i64) {
		let mv_entries = as_map(mv)?;
		let from = find_int(mv_entries, PatchKey::From as i64).and_then(as_u32).unwrap_or(0) as usize;
		let to = find_int(mv_entries, PatchKey::To as i64).and_then(as_u32).unwrap_or(0) as usize;
		op.children_move = Some(viewport_tree::ChildMove { from, to });
	}
	op.transition = find_int(entries, PatchKey::Transition as i64).and_then(as_u32).map(SlotId);
	Ok(op)
}

// --- input event / env info ------------------------------------------------

fn input_event_to_cbor(event: &InputEvent) -> Cbor {
	let mut entries = Vec::new();
	if let Some(target) = event.target {
		entries.push((Cbor::Integer((InputKey::Target as i64).into()), Cbor::Integer((target.0 as i64).into())));
	}
	if let Some(kind) = event.kind {
		entries.push((Cbor::Integer((InputKey::Kind as i64).into()), Cbor::Text(kind.as_str().to_string())));
	}
	macro_rules! put_str {
		($key:expr, $val:expr) => {
			if let Some(v) = &$val {
				entries.push((Cbor::Integer(($key as i64).into()), Cbor::Text(v.clone())));
			}
		};
	}
	macro_rules! put_f64 {
		($key:expr, $val:expr) => {
			if let Some(v) = $val {
				entries.push((Cbor::Integer(($key as i64).into()), Cbor::Float(v)));
			}
		};
	}
	put_str!(InputKey::Key, event.key);
	put_str!(InputKey::Value, event.value);
	put_f64!(InputKey::X, event.x);
	put_f64!(InputKey::Y, event.y);
	if let Some(button) = event.button {
		entries.push((Cbor::Integer((InputKey::Button as i64).into()), Cbor::Integer(button.into())));
	}
	put_str!(InputKey::Action, event.action);
	put_f64!(InputKey::ScrollTop, event.scroll_top);
	put_f64!(InputKey::ScrollLeft, event.scroll_left);
	Cbor::Map(entries)
}

fn cbor_to_input_event(v: &Cbor) -> Result<InputEvent, PayloadError> {
	let entries = as_map(v)?;
	Ok(InputEvent {
		target: find_int(entries, InputKey::Target as i64).and_then(as_u32).map(NodeId),
		kind: find_int(entries, InputKey::Kind as i64).and_then(as_str).and_then(InputKind::from_str),
		key: find_int(entries, InputKey::Key as i64).and_then(as_str).map(str::to_string),
		value: find_int(entries, InputKey::Value as i64).and_then(as_str).map(str::to_string),
		x: find_int(entries, InputKey::X as i64).and_then(as_f64),
		y: find_int(entries, InputKey::Y as i64).and_then(as_f64),
		button: find_int(entries, InputKey::Button as i64).and_then(as_i64),
		action: find_int(entries, InputKey::Action as i64).and_then(as_str).map(str::to_string),
		scroll_top: find_int(entries, InputKey::ScrollTop as i64).and_then(as_f64),
		scroll_left: find_int(entries, InputKey::ScrollLeft as i64).and_then(as_f64),
	})
}

fn env_info_to_cbor(info: &EnvInfo) -> Cbor {
	let mut entries = Vec::new();
	macro_rules! put {
		($key:expr, $val:expr, $conv:expr) => {
			if let Some(v) = $val.clone() {
				entries.push((Cbor::Integer(($key as i64).into()), $conv(v)));
			}
		};
	}
	put!(EnvKey::ViewportVersion, info.viewport_version, |v: u32| Cbor::Integer((v as i64).into()));
	put!(EnvKey::DisplayWidth, info.display_width, Cbor::Float);
	put!(EnvKey::DisplayHeight, info.display_height, Cbor::Float);
	put!(EnvKey::PixelDensity, info.pixel_density, Cbor::Float);
	put!(EnvKey::Gpu, info.gpu, Cbor::Text);
	put!(EnvKey::GpuApi, info.gpu_api, Cbor::Text);
	put!(EnvKey::ColorDepth, info.color_depth, |v: u32| Cbor::Integer((v as i64).into()));
	put!(EnvKey::VideoDecode, info.video_decode, Cbor::Bool);
	put!(EnvKey::Remote, info.remote, Cbor::Bool);
	put!(EnvKey::LatencyMs, info.latency_ms, Cbor::Float);
	Cbor::Map(entries)
}

fn cbor_to_env_info(v: &Cbor) -> Result<EnvInfo, PayloadError> {
	let entries = as_map(v)?;
	Ok(EnvInfo {
		viewport_version: find_int(entries, EnvKey::ViewportVersion as i64).and_then(as_u32),
		display_width: find_int(entries, EnvKey::DisplayWidth as i64).and_then(as_f64),
		display_height: find_int(entries, EnvKey::DisplayHeight as i64).and_then(as_f64),
		pixel_density: find_int(entries, EnvKey::PixelDensity as i64).and_then(as_f64),
		gpu: find_int(entries, EnvKey::Gpu as i64).and_then(as_str).map(str::to_string),
		gpu_api: find_int(entries, EnvKey::GpuApi as i64).and_then(as_str).map(str::to_string),
		color_depth: find_int(entries, EnvKey::ColorDepth as i64).and_then(as_u32),
		video_decode: find_int(entries, EnvKey::VideoDecode as i64).and_then(as_bool),
		remote: find_int(entries, EnvKey::Remote as i64).and_then(as_bool),
		latency_ms: find_int(entries, EnvKey::LatencyMs as i64).and_then(as_f64),
	})
}

// --- message envelope ------------------------------------------------------

/// Encodes a [`ProtocolMessage`] to its CBOR payload bytes. `Opaque`
/// messages pass their raw bytes through unchanged (spec §9).
pub fn encode_message(msg: &ProtocolMessage) -> Vec<u8> {
	let value = match msg {
		ProtocolMessage::Opaque { payload, .. } => return payload.clone(),
		ProtocolMessage::Define { slot_id, value } => {
			Cbor::Array(vec![Cbor::Integer((Opcode::Set as i64).into()), Cbor::Integer((slot_id.0 as i64).into()), slot_value_to_cbor(value)])
		}
		ProtocolMessage::Del { slot_id } => {
			Cbor::Array(vec![Cbor::Integer((Opcode::Del as i64).into()), Cbor::Integer((slot_id.0 as i64).into())])
		}
		ProtocolMessage::Patch { ops } => Cbor::Array(vec![
			Cbor::Integer((Opcode::Patch as i64).into()),
			Cbor::Array(ops.iter().map(patch_op_to_cbor).collect()),
		]),
		ProtocolMessage::Tree { root } => Cbor::Array(vec![
			Cbor::Integer((Opcode::Tree as i64).into()),
			root.as_ref().map(node_to_cbor).unwrap_or(Cbor::Null),
		]),
		ProtocolMessage::Data { schema_id, row } => Cbor::Array(vec![
			Cbor::Integer((Opcode::Data as i64).into()),
			schema_id.map(|id| Cbor::Integer((id.0 as i64).into())).unwrap_or(Cbor::Null),
			Cbor::Array(row.0.iter().map(cell_to_cbor).collect()),
		]),
		ProtocolMessage::Schema { schema_id, columns } => Cbor::Array(vec![
			Cbor::Integer((Opcode::Schema as i64).into()),
			Cbor::Integer((schema_id.0 as i64).into()),
			Cbor::Array(columns.iter().map(schema_column_to_cbor).collect()),
		]),
		ProtocolMessage::Input { event } => {
			Cbor::Array(vec![Cbor::Integer((Opcode::Input as i64).into()), input_event_to_cbor(event)])
		}
		ProtocolMessage::Env { info } => {
			Cbor::Array(vec![Cbor::Integer((Opcode::Env as i64).into()), env_info_to_cbor(info)])
		}
	};
	let mut bytes = Vec::new();
	ciborium::into_writer(&value, &mut bytes).expect("CBOR encoding of well-formed values never fails");
	bytes
}

/// Decodes a CBOR payload into a [`ProtocolMessage`]. `message_type`
/// decides whether the payload is an opaque pass-through (REGION/AUDIO/
/// CANVAS) or a CBOR opcode-tuple (spec §9, §4.2).
pub fn decode_message(message_type: MessageType, bytes: &[u8]) -> Result<ProtocolMessage, PayloadError> {
	if matches!(message_type, MessageType::Region | MessageType::Audio | MessageType::Canvas) {
		return Ok(ProtocolMessage::Opaque { message_type, payload: bytes.to_vec() });
	}

	let value: Cbor = ciborium::from_reader(bytes).map_err(|e| PayloadError::Malformed(e.to_string()))?;
	let Cbor::Array(items) = value else {
		return Err(PayloadError::Malformed("payload is not a CBOR array".into()));
	};
	let [opcode_value, args @ ..] = items.as_slice() else {
		return Err(PayloadError::Malformed("payload array is empty".into()));
	};
	let opcode_int = as_i64(opcode_value).ok_or_else(|| PayloadError::Malformed("opcode is not an integer".into()))?;
	let opcode = Opcode::from_i64(opcode_int).ok_or(PayloadError::UnknownOpcode(opcode_int))?;

	Ok(match opcode {
		Opcode::Set => {
			let [slot_id, value] = args else {
				return Err(PayloadError::Malformed("SET requires slot_id and value".into()));
			};
			ProtocolMessage::Define {
				slot_id: SlotId(as_u32(slot_id).ok_or_else(|| PayloadError::Malformed("SET slot_id not an integer".into()))?),
				value: cbor_to_slot_value(value)?,
			}
		}
		Opcode::Del => {
			let [slot_id] = args else {
				return Err(PayloadError::Malformed("DEL requires slot_id".into()));
			};
			ProtocolMessage::Del {
				slot_id: SlotId(as_u32(slot_id).ok_or_else(|| PayloadError::Malformed("DEL slot_id not an integer".into()))?),
			}
		}
		Opcode::Patch => {
			let [ops] = args else {
				return Err(PayloadError::Malformed("PATCH requires one array argument".into()));
			};
			let Cbor::Array(op_values) = ops else {
				return Err(PayloadError::Malformed("PATCH argument is not an array".into()));
			};
			ProtocolMessage::Patch { ops: op_values.iter().map(cbor_to_patch_op).collect::<Result<Vec<_>, _>>()? }
		}
		Opcode::Tree => {
			let [root] = args else {
				return Err(PayloadError::Malformed("TREE requires one argument".into()));
			};
			ProtocolMessage::Tree {
				root: match root {
					Cbor::Null => None,
					other => Some(cbor_to_node(other)?),
				},
			}
		}
		Opcode::Data => {
			let [schema_id, row] = args else {
				return Err(PayloadError::Malformed("DATA requires schema_id and row".into()));
			};
			let Cbor::Array(cells) = row else {
				return Err(PayloadError::Malformed("DATA row is not an array".into()));
			};
			ProtocolMessage::Data {
				schema_id: match schema_id {
					Cbor::Null => None,
					other => Some(SchemaId(as_u32(other).ok_or_else(|| PayloadError::Malformed("DATA schema_id not an integer".into()))?)),
				},
				row: DataRow(cells.iter().map(cbor_to_cell).collect::<Result<Vec<_>, _>>()?),
			}
		}
		Opcode::Schema => {
			let [schema_id, columns] = args else {
				return Err(PayloadError::Malformed("SCHEMA requires schema_id and columns".into()));
			};
			let Cbor::Array(column_values) = columns else {
				return Err(PayloadError::Malformed("SCHEMA columns is not an array".into()));
			};
			ProtocolMessage::Schema {
				schema_id: SchemaId(as_u32(schema_id).ok_or_else(|| PayloadError::Malformed("SCHEMA schema_id not an integer".into()))?),
				columns: column_values.iter().map(cbor_to_schema_column).collect::<Result<Vec<_>, _>>()?,
			}
		}
		Opcode::Input => {
			let [event] = args else {
				return Err(PayloadError::Malformed("INPUT requires one argument".into()));
			};
			ProtocolMessage::Input { event: cbor_to_input_event(event)? }
		}
		Opcode::Env => {
			let [info] = args else {
				return Err(PayloadError::Malformed("ENV requires one argument".into()));
			};
			ProtocolMessage::Env { info: cbor_to_env_info(info)? }
		}
	})
}

#[cfg(test)]
mod tests {
	use viewport_tree::{ColumnType, Node, NodeType, Props};

	use super::*;

	fn roundtrip(msg: ProtocolMessage) {
		let message_type = msg.message_type();
		let bytes = encode_message(&msg);
		let decoded = decode_message(message_type, &bytes).expect("decode of our own encoding must succeed");
		assert_eq!(msg, decoded);
	}

	#[test]
	fn roundtrips_define_style_slot() {
		let mut props = Props::default();
		props.gap = Some(8.0);
		props.background = Some("#112233".to_string());
		roundtrip(ProtocolMessage::Define { slot_id: SlotId(1), value: SlotValue::Style(props) });
	}

	#[test]
	fn roundtrips_define_color_and_other_slot() {
		roundtrip(ProtocolMessage::Define { slot_id: SlotId(2), value: SlotValue::Color("#ff0000".to_string()) });

		let mut fields = indexmap::IndexMap::new();
		fields.insert("delay_ms".to_string(), viewport_tree::Value::Int(250));
		roundtrip(ProtocolMessage::Define {
			slot_id: SlotId(3),
			value: SlotValue::Other { kind: "future_thing".to_string(), fields },
		});
	}

	#[test]
	fn roundtrips_tree_with_nested_children() {
		let mut root = Node::new(NodeId(1), NodeType::Box);
		let mut child = Node::new(NodeId(2), NodeType::Text);
		child.props.content = Some("hello".to_string());
		root.children.push(child);
		roundtrip(ProtocolMessage::Tree { root: Some(root) });
		roundtrip(ProtocolMessage::Tree { root: None });
	}

	#[test]
	fn roundtrips_patch_with_every_op_kind() {
		let mut insert_op = PatchOp::targeting(NodeId(1));
		insert_op.children_insert = Some(viewport_tree::ChildInsert { index: 0, node: Node::new(NodeId(9), NodeType::Separator) });

		let mut set_op = PatchOp::targeting(NodeId(2));
		let mut props = Props::default();
		props.opacity = Some(0.5);
		set_op.set = Some(props);
		set_op.transition = Some(SlotId(7));

		let mut replace_op = PatchOp::targeting(NodeId(3));
		replace_op.replace = Some(Node::new(NodeId(4), NodeType::Image));

		let remove_op = {
			let mut op = PatchOp::targeting(NodeId(5));
			op.remove = true;
			op
		};

		let move_op = {
			let mut op = PatchOp::targeting(NodeId(6));
			op.children_move = Some(viewport_tree::ChildMove { from: 0, to: 2 });
			op
		};

		let children_remove_op = {
			let mut op = PatchOp::targeting(NodeId(7));
			op.children_remove = Some(viewport_tree::ChildRemove { index: 1 });
			op
		};

		roundtrip(ProtocolMessage::Patch {
			ops: vec![insert_op, set_op, replace_op, remove_op, move_op, children_remove_op],
		});
	}

	#[test]
	fn roundtrips_data_with_every_cell_type() {
		let row = DataRow(vec![
			Cell::Str("proc".to_string()),
			Cell::U64(1234),
			Cell::I64(-7),
			Cell::F64(3.5),
			Cell::Bool(true),
			Cell::Timestamp(1_700_000_000),
		]);
		roundtrip(ProtocolMessage::Data { schema_id: Some(SchemaId(1)), row: row.clone() });
		roundtrip(ProtocolMessage::Data { schema_id: None, row });
	}

	#[test]
	fn u64_cell_above_i64_max_round_trips() {
		let row = DataRow(vec![Cell::U64(u64::MAX)]);
		roundtrip(ProtocolMessage::Data { schema_id: Some(SchemaId(1)), row });
	}

	#[test]
	fn roundtrips_schema_with_format_and_unit() {
		roundtrip(ProtocolMessage::Schema {
			schema_id: SchemaId(1),
			columns: vec![
				SchemaColumn {
					id: 0,
					name: "rss".to_string(),
					column_type: ColumnType::Uint64,
					unit: Some("bytes".to_string()),
					format: Some(viewport_tree::ColumnFormat::HumanBytes),
				},
				SchemaColumn {
					id: 1,
					name: "name".to_string(),
					column_type: ColumnType::String,
					unit: None,
					format: None,
				},
			],
		});
	}

	#[test]
	fn roundtrips_input_and_env() {
		roundtrip(ProtocolMessage::Input {
			event: InputEvent {
				target: Some(NodeId(4)),
				kind: Some(InputKind::Click),
				x: Some(10.0),
				y: Some(20.0),
				button: Some(0),
				..Default::default()
			},
		});
		roundtrip(ProtocolMessage::Env {
			info: EnvInfo {
				viewport_version: Some(1),
				display_width: Some(1920.0),
				display_height: Some(1080.0),
				gpu: Some("metal".to_string()),
				..Default::default()
			},
		});
	}

	#[test]
	fn opaque_messages_pass_raw_bytes_through_unchanged() {
		let payload = vec![1, 2, 3, 4, 5];
		let msg = ProtocolMessage::Opaque { message_type: MessageType::Region, payload: payload.clone() };
		assert_eq!(encode_message(&msg), payload);
		let decoded = decode_message(MessageType::Region, &payload).unwrap();
		assert_eq!(decoded, msg);
	}

	#[test]
	fn unknown_opcode_is_reported_not_panicked() {
		let bytes = {
			let mut buf = Vec::new();
			ciborium::into_writer(&Cbor::Array(vec![Cbor::Integer(99i64.into())]), &mut buf).unwrap();
			buf
		};
		let err = decode_message(MessageType::Define, &bytes).unwrap_err();
		assert!(matches!(err, PayloadError::UnknownOpcode(99)));
	}

	#[test]
	fn malformed_payload_is_reported_not_panicked() {
		let err = decode_message(MessageType::Tree, b"\xff\xff\xff").unwrap_err();
		assert!(matches!(err, PayloadError::Malformed(_)));
	}

	#[test]
	fn unrecognized_node_keys_are_dropped_not_rejected() {
		// A node map with an extra unknown integer key must still decode,
		// per the decoder tolerance rule (spec §4.2/§7).
		let entries = vec![
			(Cbor::Integer(0i64.into()), Cbor::Integer(1i64.into())),
			(Cbor::Integer(1i64.into()), Cbor::Text("box".to_string())),
			(Cbor::Integer(999i64.into()), Cbor::Text("ignored".to_string())),
		];
		let node = cbor_to_node(&Cbor::Map(entries)).unwrap();
		assert_eq!(node.id, NodeId(1));
		assert_eq!(node.node_type, NodeType::Box);
	}

	// P3 (codec round-trip, spec §8): decode(encode(m)) == m for an
	// arbitrary DATA message, whose cells and optional schema id are cheap
	// to generate independently of the tree/patch shapes exercised above.
	proptest::proptest! {
		#[test]
		fn data_message_round_trips_for_arbitrary_cells(
			schema_id in proptest::option::of(0u32..1000),
			name in ".*",
			amount in proptest::num::u64::ANY,
			flag in proptest::bool::ANY,
		) {
			let row = DataRow(vec![Cell::Str(name), Cell::U64(amount), Cell::Bool(flag)]);
			let msg = ProtocolMessage::Data { schema_id: schema_id.map(SchemaId), row };
			let bytes = encode_message(&msg);
			let decoded = decode_message(MessageType::Data, &bytes).unwrap();
			proptest::prop_assert_eq!(decoded, msg);
		}
	}
}
