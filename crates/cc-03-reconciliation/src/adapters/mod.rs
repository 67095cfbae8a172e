//! Adapters for the local confirmation store port

pub mod memory;

pub use memory::InMemoryLocalConfirmationStore;
