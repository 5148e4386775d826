//! Hardware Abstraction Layer (HAL)
//!
//! Interfaces que o ambiente hospedeiro (kernel, hypervisor, testes) implementa
//! para que o driver alcance memória física, temporização e o ponto de
//! entrada do firmware sem depender de um sistema operacional específico.

pub mod platform;
pub mod traits;

pub use platform::Platform;
pub use traits::*;
