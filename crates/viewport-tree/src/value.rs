//! A small self-describing value, used only for the passthrough fields of
//! open-ended [`crate::slot::SlotValue`] kinds. `viewport-wire` converts
//! between this and CBOR; this crate has no codec dependency of its own.

use indexmap::IndexMap;

/// A dynamically-typed scalar or container value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
	Bytes(Vec<u8>),
	Array(Vec<Value>),
	/// Order-preserving string-keyed map (slot fields are string-keyed per
	/// spec §4.2: "other slot fields may keep string keys").
	Map(IndexMap<String, Value>),
}
