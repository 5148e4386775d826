//! # Convenções de Chamada do Firmware
//!
//! O módulo `arch` é a **única** ponte entre o motor de chamadas (agnóstico) e a
//! ABI da máquina. O firmware CGEB é um blob bimodal: a mesma imagem é chamada
//! de código 32-bit (cdecl, ponteiros far) ou 64-bit (SysV ou Microsoft).
//!
//! - `x86`: `entry(cs, fps, ds)` com `cs = 0` pedindo retorno near.
//! - `x86_64`: ponteiro do FPS duplicado nos slots das duas ABIs.
//!
//! Outras arquiteturas não têm CGEB; `native_entry` devolve `NotImplemented`.

use crate::cgeb::entry::FirmwareEntry;
use crate::ioctl::error::CgosResult;
use alloc::boxed::Box;

#[cfg(target_arch = "x86")]
pub mod x86;

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

/// Constrói o ponto de entrada nativo para código relocado em `address`.
#[cfg(target_arch = "x86_64")]
pub fn native_entry(address: usize, _data_segment: u16) -> CgosResult<Box<dyn FirmwareEntry>> {
    Ok(Box::new(x86_64::DualAbiEntry::new(address)))
}

/// Constrói o ponto de entrada nativo para código relocado em `address`.
#[cfg(target_arch = "x86")]
pub fn native_entry(address: usize, data_segment: u16) -> CgosResult<Box<dyn FirmwareEntry>> {
    Ok(Box::new(x86::NearFarEntry::near(address, data_segment)))
}

/// Constrói o ponto de entrada nativo para código relocado em `address`.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub fn native_entry(_address: usize, _data_segment: u16) -> CgosResult<Box<dyn FirmwareEntry>> {
    crate::kerror!("(Arch) CGEB não suportado nesta arquitetura");
    Err(crate::ioctl::error::CgosError::NotImplemented)
}
