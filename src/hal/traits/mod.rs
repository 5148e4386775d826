//! Traits do HAL
//!
//! Define as interfaces abstratas para hardware.

pub mod delay;
pub mod memory;

pub use delay::*;
pub use memory::*;
