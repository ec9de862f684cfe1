//! Opaque identifiers for the three disjoint id namespaces (§3: "`id`
//! namespaces are disjoint between nodes, slots, and schemas").

use std::fmt;

macro_rules! wire_id {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name(pub u32);

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<u32> for $name {
			fn from(v: u32) -> Self {
				Self(v)
			}
		}
	};
}

wire_id!(NodeId, "Unique identifier for a tree node, assigned by the source.");
wire_id!(SlotId, "Unique identifier for a slot (reusable definition).");
wire_id!(SchemaId, "Unique identifier for a schema (ordered column list).");
