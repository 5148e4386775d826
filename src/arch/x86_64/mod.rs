//! Implementação x86_64

pub mod entry;

pub use entry::DualAbiEntry;
