//! Adapters for the extraction source port

pub mod file;
pub mod memory;

pub use file::JsonFileExtractionSource;
pub use memory::InMemoryExtractionSource;
