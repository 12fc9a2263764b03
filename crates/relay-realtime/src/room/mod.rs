//! Named broadcast groups and the reverse membership index.

pub mod membership;
pub mod registry;

pub use registry::RoomRegistry;
