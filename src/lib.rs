//! CGEB — Motor de Chamadas ao Firmware e Dispatcher CGOS.
//!
//! Ponto central de exportação dos módulos do driver.
//!
//! O firmware CGEB é uma extensão de BIOS residente em memória física.
//! Este crate localiza seus descritores, reloca o código para memória própria,
//! executa as funções via protocolo FPS (com continuações) e expõe tudo através
//! de uma interface genérica de requisição/resposta no formato IOCTL.
//!
//! ```text
//! ioctl ──► dispatch::table ──► board::resolve ──► cgeb::marshal ──► cgeb::engine
//!                                                                       │
//!                                    (probe) cgeb::descriptor ◄─────────┘
//! ```

#![cfg_attr(not(test), no_std)]

// Alocação dinâmica (Vec/Box para regiões do firmware e boards)
extern crate alloc;

// --- Infraestrutura ---
pub mod core; // Logging, configuração
pub mod hal; // Traits de plataforma (memória física, delays)

// --- Baixo nível ---
pub mod arch; // Convenções de chamada por arquitetura
pub mod cgeb; // Protocolo FPS, descritores, motor de chamadas

// --- Alto nível ---
pub mod board; // Boards, storage areas, resolução de unidades
pub mod ioctl; // Envelope genérico e tabela de dispatch

#[cfg(test)]
pub(crate) mod testing;

// Re-exports principais
pub use crate::board::{Board, BoardRegistry};
pub use crate::core::config::DriverConfig;
pub use crate::hal::Platform;
pub use crate::ioctl::error::{CgosError, CgosResult};
pub use crate::ioctl::CgosDriver;
