//! Process-local error types for the store and patch engine. Wire-crossing
//! error codes live in `viewport-wire::error` (see SPEC_FULL.md §12).

use crate::ids::NodeId;

/// Errors from building or splicing a subtree into a [`crate::tree::RenderTree`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TreeError {
	/// A subtree being inserted reuses an id already present in the tree
	/// (§9: "Insert operations must reject subtrees containing ids already
	/// present in the index"). This repo resolves the open question in
	/// favor of explicit rejection rather than silent overwrite.
	#[error("node id {0} already present in tree")]
	DuplicateNodeId(NodeId),
	/// A subtree being inserted contains the same id twice within itself.
	#[error("node id {0} repeated within a single subtree")]
	DuplicateWithinSubtree(NodeId),
}
