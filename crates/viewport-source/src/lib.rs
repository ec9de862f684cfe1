//! Source-side state (C6, spec §4.6): the pending/published double buffer
//! that turns tree/slot/schema/data mutations into an ordered message batch.

pub mod coalesce;
pub mod error;
pub mod state;

pub use error::SourceError;
pub use state::SourceState;
