//! # Resolução de Unidades
//!
//! O chamador endereça uma unidade por classe lógica + índice:
//!
//! ```text
//! unit = classe (bits 16..31) | índice (bits 0..15)
//! ```
//!
//! Classe 0 significa "qualquer". A resolução devolve o número de unidade do
//! firmware ou `None` quando não existe a k-ésima unidade da classe.

use super::storage::StorageArea;
use crate::cgeb::functions::CGEB_I2C_GET_INFO;
use crate::cgeb::{FirmwareContext, FwRecord, RecordKind};
use crate::ioctl::error::{CgosError, CgosResult};

pub const UNIT_CLASS_MASK: u32 = 0xFFFF_0000;
pub const UNIT_INDEX_MASK: u32 = 0x0000_FFFF;

// Tipos de barramento I2C
pub const I2C_TYPE_MASK: u32 = 0xFFFF_0000;
pub const I2C_TYPE_PRIMARY: u32 = 0x0001_0000;
pub const I2C_TYPE_SMB: u32 = 0x0002_0000;
pub const I2C_TYPE_DDC: u32 = 0x0003_0000;

/// Separa classe e índice.
#[inline]
pub fn split_unit(unit: u32) -> (u32, usize) {
    (unit & UNIT_CLASS_MASK, (unit & UNIT_INDEX_MASK) as usize)
}

// =============================================================================
// STORAGE
// =============================================================================

fn storage_matches(area: &StorageArea, class: u32) -> bool {
    if class == 0 {
        !area.is_reserved()
    } else {
        area.class() == class
    }
}

/// Áreas da classe, na ordem de declaração do firmware.
pub fn storage_count(areas: &[StorageArea], class: u32) -> usize {
    areas.iter().filter(|a| storage_matches(a, class)).count()
}

/// k-ésima área da classe pedida.
pub fn storage<'a>(areas: &'a [StorageArea], unit: u32) -> Option<&'a StorageArea> {
    let (class, index) = split_unit(unit);
    areas.iter().filter(|a| storage_matches(a, class)).nth(index)
}

// =============================================================================
// I2C
// =============================================================================

/// Tipo do barramento `bus` (consultado ao firmware).
pub fn i2c_type(ctx: &mut FirmwareContext, bus: u32) -> CgosResult<u32> {
    match ctx.invoke_record(CGEB_I2C_GET_INFO, bus, RecordKind::I2cInfo)? {
        FwRecord::I2cInfo(info) => Ok(info.kind),
        _ => Err(CgosError::Error),
    }
}

/// Barramentos da classe. A contagem não é cacheada: cada candidato é
/// consultado.
pub fn i2c_count(ctx: &mut FirmwareContext, buses: u32, class: u32) -> CgosResult<u32> {
    if class == 0 {
        return Ok(buses);
    }
    let mut count = 0;
    for bus in 0..buses {
        if i2c_type(ctx, bus)? & I2C_TYPE_MASK == class {
            count += 1;
        }
    }
    Ok(count)
}

/// Índice direto (classe 0), sem consultar o firmware.
pub fn i2c_index(buses: u32, unit: u32) -> Option<u32> {
    let (_, index) = split_unit(unit);
    (index < buses as usize).then_some(index as u32)
}

/// k-ésimo barramento da classe pedida.
pub fn i2c(ctx: &mut FirmwareContext, buses: u32, unit: u32) -> CgosResult<Option<u32>> {
    let (class, index) = split_unit(unit);
    if class == 0 {
        return Ok(i2c_index(buses, unit));
    }

    let mut seen = 0;
    for bus in 0..buses {
        if i2c_type(ctx, bus)? & I2C_TYPE_MASK == class {
            if seen == index {
                return Ok(Some(bus));
            }
            seen += 1;
        }
    }
    Ok(None)
}

// =============================================================================
// WATCHDOG
// =============================================================================

/// Watchdogs não têm classe: o índice precisa existir.
pub fn watchdog(count: u32, unit: u32) -> Option<u32> {
    (unit < count).then_some(unit)
}
