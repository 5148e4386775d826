//! Entrada CGEB em modo protegido (32-bit).
//!
//! O firmware expõe uma função C bimodal `entry(cs, fps, ds)` com todos os
//! argumentos na pilha (cdecl, removidos pelo chamador):
//!
//! - `cs == 0`: o firmware executa `ret` (near). É o único modo usado aqui,
//!   já que a chamada é feita com `call` near.
//! - `cs != 0`: o firmware executa `retf` (far).
//! - `ds`: seletor do segmento de dados, também gravado em `fps.data.seg`.

use crate::cgeb::entry::FirmwareEntry;
use crate::cgeb::fps::Fps;

/// Assinatura da entrada bimodal
type CgebEntryFn = extern "cdecl" fn(u32, *mut Fps, u32);

/// Ponto de entrada 32-bit.
#[derive(Debug, Clone, Copy)]
pub struct NearFarEntry {
    entry: usize,
    /// Discriminador de segmento de código (0 = retorno near)
    cs: u16,
    ds: u16,
}

impl NearFarEntry {
    /// Entrada chamada com `call` near.
    pub const fn near(entry: usize, ds: u16) -> Self {
        Self { entry, cs: 0, ds }
    }
}

impl FirmwareEntry for NearFarEntry {
    #[inline]
    fn address(&self) -> usize {
        self.entry
    }

    unsafe fn invoke(&self, fps: *mut Fps) {
        let f: CgebEntryFn = core::mem::transmute::<usize, CgebEntryFn>(self.entry);
        f(self.cs as u32, fps, self.ds as u32);
    }
}
