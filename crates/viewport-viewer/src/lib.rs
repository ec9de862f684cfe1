//! Viewer-side apply-message loop and dirty tracking for the Viewport
//! protocol (C7, spec §4.7). Sits on top of `viewport-tree`'s store and
//! patch engine and `viewport-wire`'s decoded message types; holds no
//! transport or frame-alignment logic of its own.

pub mod dirty;
pub mod error;
pub mod state;

pub use dirty::DirtySet;
pub use error::ViewerError;
pub use state::ViewerState;
