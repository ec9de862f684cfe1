//! Process-local errors for [`crate::state::SourceState`] (SPEC_FULL.md §12).

/// Failures from [`crate::state::SourceState::flush`]. Only a `TREE` flush
/// can fail, by way of [`viewport_tree::TreeError`] when the pending subtree
/// reuses an id already present in the published tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
	#[error("failed to publish pending tree: {0}")]
	Tree(#[from] viewport_tree::TreeError),
}
