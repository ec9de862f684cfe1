//! Render tree store, patch engine, and text projection for the Viewport
//! protocol (C3, C4, C5). Pure domain logic: no I/O, no wire format, no
//! async — see `viewport-wire` for the codec that carries these types.

pub mod data;
pub mod error;
pub mod ids;
pub mod node;
pub mod patch;
pub mod projection;
pub mod props;
pub mod schema;
pub mod slot;
pub mod tree;
pub mod value;

pub use data::{Cell, DataRow};
pub use error::TreeError;
pub use ids::{NodeId, SchemaId, SlotId};
pub use node::{Node, NodeType};
pub use patch::{ChildInsert, ChildMove, ChildRemove, PatchBatchResult, PatchOp, apply_batch};
pub use projection::project;
pub use props::Props;
pub use schema::{ColumnFormat, ColumnType, SchemaColumn};
pub use slot::SlotValue;
pub use tree::{NodeRecord, RenderTree};
pub use value::Value;

#[cfg(test)]
mod tests;
