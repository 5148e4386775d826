//! Storage areas de uma board.
//!
//! Enumeradas uma vez no probe e cacheadas (no máximo `MAX_STORAGE_AREAS`).

use crate::cgeb::functions::{CGEB_STORAGE_AREA_COUNT, CGEB_STORAGE_AREA_GET_INFO};
use crate::cgeb::{FirmwareContext, FwRecord, InvokeFlags, RecordKind};
use crate::core::config::MAX_STORAGE_AREAS;
use crate::ioctl::error::{CgosError, CgosResult};
use alloc::vec::Vec;

// =============================================================================
// TIPOS
// =============================================================================

/// Parte do tipo que identifica a classe
pub const STORAGE_TYPE_MASK: u32 = 0xFFFF_0000;

pub const STORAGE_EEPROM: u32 = 0x0001_0000;
pub const STORAGE_FLASH: u32 = 0x0002_0000;
pub const STORAGE_CMOS: u32 = 0x0003_0000;
pub const STORAGE_RAM: u32 = 0x0004_0000;

/// Áreas com estes bits não aparecem na busca genérica (classe 0)
pub const STORAGE_RESERVED_BITS: u32 = 0x8000_0000 | 0x4000_0000;

/// Uma storage area cacheada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageArea {
    /// Unidade do firmware
    pub index: u32,
    pub kind: u32,
    pub flags: u32,
    pub size: u32,
    pub block_size: u32,
}

impl StorageArea {
    #[inline]
    pub fn class(&self) -> u32 {
        self.kind & STORAGE_TYPE_MASK
    }

    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.kind & STORAGE_RESERVED_BITS != 0
    }

    /// `true` se `[offset, offset + len)` cabe na área
    pub fn contains(&self, offset: u32, len: u32) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.size)
    }
}

/// Lê contagem e informação de cada área.
pub fn enumerate(ctx: &mut FirmwareContext) -> CgosResult<Vec<StorageArea>> {
    let mut count = ctx.invoke_plain(CGEB_STORAGE_AREA_COUNT, InvokeFlags::RETS0)? as usize;
    if count > MAX_STORAGE_AREAS {
        crate::kwarn!("(Storage) Áreas além do limite=", count);
        count = MAX_STORAGE_AREAS;
    }

    let mut areas = Vec::with_capacity(count);
    for index in 0..count as u32 {
        let FwRecord::StorageInfo(rec) =
            ctx.invoke_record(CGEB_STORAGE_AREA_GET_INFO, index, RecordKind::StorageInfo)?
        else {
            return Err(CgosError::Error);
        };
        areas.push(StorageArea {
            index,
            kind: rec.kind,
            flags: rec.flags,
            size: rec.size,
            block_size: rec.block_size,
        });
    }
    Ok(areas)
}
