//! Persistent store backends for Chatgate.
//!
//! Both backends persist a [`StoredState`](chatgate_core::StoredState)
//! envelope as JSON, so documents are interchangeable between them.
//!
//! - [`MemoryStore`]: process-local, for tests and ephemeral sessions
//! - [`JsonFileStore`]: one JSON file per key in a directory

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
