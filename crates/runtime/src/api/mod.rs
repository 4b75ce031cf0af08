//! Public runtime API surface.
//!
//! Error types and the collaborator traits an embedding server implements to
//! receive combat text and to move fleeing combatants.

pub mod errors;
pub mod narration;

pub use errors::{Result, RuntimeError};
pub use narration::{Delivery, FleeHandler, NarrationSink, NoEscape, RecordingSink, TracingSink};
