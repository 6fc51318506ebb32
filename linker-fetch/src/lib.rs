//! Module fetchers for the shader import linker.
//!
//! Anything implementing [`linker_core::ModuleFetcher`] can feed a resolve call; this crate
//! provides the ones the command line tool uses plus an in-memory table for embedding.

pub mod cached;
pub mod dir;
pub mod memory;

pub use cached::CachedFetcher;
pub use dir::DirFetcher;
pub use memory::MemoryFetcher;
