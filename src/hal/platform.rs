//! Plataforma hospedeira
//!
//! Junta os serviços do HAL num único objeto compartilhado pelo contexto de
//! firmware (`Arc<dyn Platform>`).

use super::traits::{Delay, PhysMemory};
use crate::cgeb::entry::FirmwareEntry;
use crate::ioctl::error::CgosResult;
use alloc::boxed::Box;

/// Ambiente completo que o driver exige.
pub trait Platform: PhysMemory + Delay + Send + Sync {
    /// Seletor de segmento de dados entregue ao firmware (0 em modo flat 64-bit).
    fn data_segment(&self) -> u16 {
        0
    }

    /// Constrói o ponto de entrada para o código relocado em `address`.
    ///
    /// O padrão usa a convenção de chamada nativa da arquitetura alvo.
    fn entry_at(&self, address: usize, data_segment: u16) -> CgosResult<Box<dyn FirmwareEntry>> {
        crate::arch::native_entry(address, data_segment)
    }
}
