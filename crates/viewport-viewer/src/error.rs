//! Process-local errors for [`crate::state::ViewerState`] (SPEC_FULL.md §12).

/// Failures from [`crate::state::ViewerState::apply_message`]. Only a
/// `TREE` application can fail, by way of [`viewport_tree::TreeError`] when
/// the incoming root reuses an id already present in the rebuilt tree (the
/// tree is cleared before the new root is inserted, so this can only arise
/// from a duplicate id within the incoming subtree itself).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ViewerError {
	#[error("failed to apply TREE message: {0}")]
	Tree(#[from] viewport_tree::TreeError),
}
