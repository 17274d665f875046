//! In-process world adapters.

pub mod memory;

pub use memory::{CHUNK_SIZE, MemoryHost, MemoryWorld};
