//! Storage backends for recall-memory

mod session_log;
pub mod vector;

pub use session_log::SessionLogs;
pub use vector::{FlatIndex, Neighbor, VectorIndex};
