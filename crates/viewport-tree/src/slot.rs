//! Slot values: keyed, reusable definitions (spec §3, "Slot value").
//!
//! The `kind` discriminant takes integer key `0` on the wire; every other
//! field of an open-ended kind keeps its string key, so unrecognized kinds
//! round-trip losslessly via [`SlotValue::Other`].

use indexmap::IndexMap;

use crate::ids::SchemaId;
use crate::props::Props;
use crate::value::Value;

/// A tagged slot value (spec §3). `kind` is the wire discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
	/// A reusable prop set, applied by reference via a node's `style` key.
	Style(Props),
	Color(String),
	Keybind { key: String, action: String },
	Transition { duration_ms: u64, easing: String },
	TextSize(f64),
	/// Aliases a schema table entry, for slot-based indirection to a
	/// `schemas` id (spec §6: "schema (schema slot id)").
	Schema(SchemaId),
	/// References a schema by id (spec §3: "A `row_template` references a
	/// `schema` slot by id"; resolved directly against the `schemas` table
	/// per the worked example in spec §8.6 rather than through a second
	/// layer of `SlotValue::Schema` indirection — see DESIGN.md).
	RowTemplate { schema: SchemaId },
	/// Any kind outside the closed set above. Fields keep their string keys
	/// so round-tripping through an implementation that doesn't understand
	/// this kind is lossless (spec §4.2).
	Other { kind: String, fields: IndexMap<String, Value> },
}

impl SlotValue {
	/// The wire `kind` string for this slot value.
	pub fn kind(&self) -> &str {
		match self {
			SlotValue::Style(_) => "style",
			SlotValue::Color(_) => "color",
			SlotValue::Keybind { .. } => "keybind",
			SlotValue::Transition { .. } => "transition",
			SlotValue::TextSize(_) => "text_size",
			SlotValue::Schema(_) => "schema",
			SlotValue::RowTemplate { .. } => "row_template",
			SlotValue::Other { kind, .. } => kind,
		}
	}
}
