//! Conversions between CBOR [`ciborium::Value`] and `viewport-tree`'s
//! passthrough [`viewport_tree::Value`] (used inside open-ended
//! `SlotValue::Other` fields).

use ciborium::Value as Cbor;
use indexmap::IndexMap;
use viewport_tree::Value;

pub fn value_to_cbor(value: &Value) -> Cbor {
	match value {
		Value::Null => Cbor::Null,
		Value::Bool(b) => Cbor::Bool(*b),
		Value::Int(i) => Cbor::Integer((*i).into()),
		Value::Float(f) => Cbor::Float(*f),
		Value::Text(s) => Cbor::Text(s.clone()),
		Value::Bytes(b) => Cbor::Bytes(b.clone()),
		Value::Array(items) => Cbor::Array(items.iter().map(value_to_cbor).collect()),
		Value::Map(map) => Cbor::Map(map.iter().map(|(k, v)| (Cbor::Text(k.clone()), value_to_cbor(v))).collect()),
	}
}

pub fn cbor_to_value(cbor: &Cbor) -> Value {
	match cbor {
		Cbor::Null => Value::Null,
		Cbor::Bool(b) => Value::Bool(*b),
		Cbor::Integer(i) => Value::Int(i64::try_from(*i).unwrap_or(0)),
		Cbor::Float(f) => Value::Float(*f),
		Cbor::Text(s) => Value::Text(s.clone()),
		Cbor::Bytes(b) => Value::Bytes(b.clone()),
		Cbor::Array(items) => Value::Array(items.iter().map(cbor_to_value).collect()),
		Cbor::Map(entries) => {
			let mut map = IndexMap::new();
			for (k, v) in entries {
				if let Cbor::Text(key) = k {
					map.insert(key.clone(), cbor_to_value(v));
				}
			}
			Value::Map(map)
		}
		_ => Value::Null,
	}
}
