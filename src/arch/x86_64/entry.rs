//! Entrada CGEB em modo longo (64-bit).
//!
//! O blob 64-bit do CGEB pode ter sido compilado para a ABI SysV ou para a
//! ABI Microsoft x64. Para ser chamável igual nas duas:
//!
//! | Registrador | SysV        | Microsoft   | Valor       |
//! |-------------|-------------|-------------|-------------|
//! | RDI         | arg0        | (preservado)| fps         |
//! | RSI         | arg1        | (preservado)| fps         |
//! | RCX         | arg3        | arg0        | fps         |
//! | RDX         | arg2        | arg1        | 0 (obrig.)  |
//!
//! RDX carrega o discriminador de segmento de código: precisa ser zero para o
//! firmware executar um retorno near. Reservamos 32 bytes de shadow space
//! exigidos pela ABI Microsoft.

use crate::cgeb::entry::FirmwareEntry;
use crate::cgeb::fps::Fps;
use core::arch::asm;

/// Ponto de entrada 64-bit chamável pelas duas ABIs.
#[derive(Debug, Clone, Copy)]
pub struct DualAbiEntry {
    entry: usize,
}

impl DualAbiEntry {
    pub const fn new(entry: usize) -> Self {
        Self { entry }
    }
}

impl FirmwareEntry for DualAbiEntry {
    #[inline]
    fn address(&self) -> usize {
        self.entry
    }

    unsafe fn invoke(&self, fps: *mut Fps) {
        // clobber_abi("sysv64") cobre o conjunto volátil da ABI Microsoft
        // (RAX, RCX, RDX, R8-R11, XMM0-5), que é um subconjunto.
        asm!(
            "sub rsp, 32",
            "call {entry}",
            "add rsp, 32",
            entry = in(reg) self.entry,
            in("rdi") fps,
            in("rsi") fps,
            in("rcx") fps,
            in("rdx") 0usize,
            clobber_abi("sysv64"),
        );
    }
}
