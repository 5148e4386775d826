//! Implementação x86 (32-bit)

pub mod entry;

pub use entry::NearFarEntry;
