//! Interface de Memória Física
//!
//! O firmware CGEB vive em memória física (ROM de BIOS) e pede mapeamentos
//! adicionais em runtime. O driver nunca assume um mapa identidade: todo acesso
//! passa por `PhysMemory::map`.

use crate::ioctl::error::CgosResult;
use core::ptr::NonNull;

/// Mapeamento de memória física para o espaço virtual do driver.
pub trait PhysMemory {
    /// Mapeia `[phys, phys + len)` e devolve o endereço virtual do início.
    fn map(&self, phys: u64, len: usize) -> CgosResult<NonNull<u8>>;

    /// Desfaz um mapeamento devolvido por `map`.
    fn unmap(&self, virt: NonNull<u8>, len: usize);

    /// Torna executável a região onde o código do firmware foi relocado.
    ///
    /// Ambientes com W^X devem trocar as permissões aqui.
    fn prepare_code(&self, _code: NonNull<u8>, _len: usize) -> CgosResult<()> {
        Ok(())
    }
}

/// Janela física mapeada com escopo.
///
/// O `Drop` desfaz o mapeamento, então toda saída (sucesso, erro, `?`)
/// libera a janela.
pub struct PhysWindow<'a, M: PhysMemory + ?Sized> {
    mem: &'a M,
    phys: u64,
    virt: NonNull<u8>,
    len: usize,
}

impl<'a, M: PhysMemory + ?Sized> PhysWindow<'a, M> {
    /// Mapeia a janela
    pub fn map(mem: &'a M, phys: u64, len: usize) -> CgosResult<Self> {
        let virt = mem.map(phys, len)?;
        Ok(Self {
            mem,
            phys,
            virt,
            len,
        })
    }

    #[inline]
    pub fn phys(&self) -> u64 {
        self.phys
    }

    #[inline]
    pub fn virt(&self) -> NonNull<u8> {
        self.virt
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<M: PhysMemory + ?Sized> Drop for PhysWindow<'_, M> {
    fn drop(&mut self) {
        self.mem.unmap(self.virt, self.len);
    }
}

/// Janela mapeada de longa duração (entradas do memory-map do firmware).
///
/// Pertence ao contexto de firmware, que a desfaz no próprio `Drop`.
#[derive(Debug, Clone, Copy)]
pub struct MappedRegion {
    pub phys: u64,
    pub virt: NonNull<u8>,
    pub len: usize,
}
