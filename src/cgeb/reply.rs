//! # Registros Devolvidos pelo Firmware
//!
//! Algumas funções devolvem em `optr` um ponteiro para um registro escrito
//! pelo firmware. A reinterpretação acontece num único lugar, logo após a
//! chamada: `FwRecord::decode` copia os campos para tipos Rust e só a tabela
//! de memory-map continua referenciando memória do firmware (o driver precisa
//! escrever nela).

use super::fps::FarPtr;
use crate::ioctl::error::{CgosError, CgosResult};
use alloc::vec::Vec;
use core::mem::size_of;
use core::ptr::{self, NonNull};

// =============================================================================
// LAYOUTS
// =============================================================================

/// Entrada da tabela de memory-map.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MapMem {
    /// Endereço físico pedido pelo firmware
    pub phys: usize,
    /// Tamanho em bytes
    pub size: u32,
    /// Endereço virtual gravado pelo driver
    pub virt: FarPtr,
}

/// Cabeçalho da tabela (entradas seguem imediatamente).
#[repr(C)]
#[allow(dead_code)]
struct MapMemList {
    count: u32,
    entries: [MapMem; 0],
}

/// Offset da primeira entrada
pub const MAP_ENTRIES_OFFSET: usize = size_of::<MapMemList>();

/// Tamanho do registro de identificação da board
pub const BOARD_INFO_SIZE: usize = 172;

/// Tamanho mínimo do registro de storage area
pub const STORAGE_INFO_SIZE: usize = 20;

/// Tamanho mínimo do registro de barramento I2C
pub const I2C_INFO_SIZE: usize = 16;

// Offsets no registro de board (strings ASCII de 16 bytes)
const BOARD_NAME_OFF: usize = 20;
const BOARD_SUB_OFF: usize = 36;
const BOARD_MANUFACTURER_OFF: usize = 52;
const BOARD_SERIAL_OFF: usize = 100;
const BOARD_PRIMARY_CLASS_OFF: usize = 128;
const BOARD_PART_OFF: usize = 136;
const BOARD_STRING_LEN: usize = 16;

// =============================================================================
// TABELA DE MEMORY-MAP
// =============================================================================

/// Tabela de memory-map autorada pelo firmware.
///
/// Continua apontando para a memória do firmware: o driver grava nela os
/// endereços virtuais e avisa com `CgebMapChanged`.
#[derive(Debug)]
pub struct MapTable {
    base: NonNull<u8>,
    count: usize,
}

// SAFETY: a tabela vive na memória do firmware, acessada só sob o mutex da board.
unsafe impl Send for MapTable {}

impl MapTable {
    /// # Safety
    ///
    /// `base` aponta para uma tabela válida escrita pelo firmware.
    unsafe fn from_raw(base: NonNull<u8>) -> Self {
        let count = ptr::read_unaligned(base.as_ptr().cast::<u32>()) as usize;
        Self { base, count }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn entry_ptr(&self, index: usize) -> *mut MapMem {
        // SAFETY: index < count (verificado pelos chamadores).
        unsafe {
            self.base
                .as_ptr()
                .add(MAP_ENTRIES_OFFSET + index * size_of::<MapMem>())
                .cast::<MapMem>()
        }
    }

    /// Lê a entrada `index`.
    pub fn entry(&self, index: usize) -> Option<MapMem> {
        if index >= self.count {
            return None;
        }
        // SAFETY: dentro da tabela declarada pelo firmware.
        Some(unsafe { ptr::read_unaligned(self.entry_ptr(index)) })
    }

    /// Grava o endereço virtual da entrada `index`.
    pub fn set_virt(&mut self, index: usize, virt: usize, seg: u16) -> CgosResult<()> {
        let mut entry = self.entry(index).ok_or(CgosError::InvalidParameter)?;
        entry.virt = FarPtr { off: virt, seg, pad: 0 };
        // SAFETY: dentro da tabela declarada pelo firmware.
        unsafe { ptr::write_unaligned(self.entry_ptr(index), entry) };
        Ok(())
    }
}

// =============================================================================
// REGISTROS COPIADOS
// =============================================================================

/// Identificação estática da board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRecord {
    /// Registro completo como devolvido (tamanho declarado no primeiro u32)
    pub raw: Vec<u8>,
}

impl BoardRecord {
    fn field(&self, offset: usize) -> &str {
        let end = (offset + BOARD_STRING_LEN).min(self.raw.len());
        if offset >= end {
            return "";
        }
        ascii_field(&self.raw[offset..end])
    }

    pub fn name(&self) -> &str {
        self.field(BOARD_NAME_OFF)
    }

    pub fn sub_name(&self) -> &str {
        self.field(BOARD_SUB_OFF)
    }

    pub fn manufacturer(&self) -> &str {
        self.field(BOARD_MANUFACTURER_OFF)
    }

    pub fn serial(&self) -> &str {
        self.field(BOARD_SERIAL_OFF)
    }

    pub fn part_number(&self) -> &str {
        self.field(BOARD_PART_OFF)
    }

    /// Classe principal (CPU, VM, ...)
    pub fn primary_class(&self) -> u32 {
        le_u32(&self.raw, BOARD_PRIMARY_CLASS_OFF).unwrap_or(0)
    }
}

/// Informação de uma storage area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageRecord {
    pub kind: u32,
    pub flags: u32,
    pub size: u32,
    pub block_size: u32,
}

/// Informação de um barramento I2C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cRecord {
    pub kind: u32,
    pub frequency: u32,
    pub max_frequency: u32,
}

/// Que registro esperar em `optr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    MapList,
    BoardInfo,
    StorageInfo,
    I2cInfo,
}

/// Registro decodificado.
#[derive(Debug)]
pub enum FwRecord {
    MapList(MapTable),
    BoardInfo(BoardRecord),
    StorageInfo(StorageRecord),
    I2cInfo(I2cRecord),
}

impl FwRecord {
    /// Decodifica o registro apontado por `optr`.
    ///
    /// Um `optr` nulo devolve uma tabela de memory-map vazia (nada a mapear) e
    /// é erro para os demais registros.
    ///
    /// # Safety
    ///
    /// `optr`, se não-nulo, aponta para um registro do tipo `kind` válido.
    pub unsafe fn decode(kind: RecordKind, optr: *const u8) -> CgosResult<Self> {
        let Some(base) = NonNull::new(optr as *mut u8) else {
            return match kind {
                RecordKind::MapList => Ok(Self::MapList(MapTable {
                    base: NonNull::dangling(),
                    count: 0,
                })),
                _ => {
                    crate::kwarn!("(CGEB) Registro esperado mas optr nulo");
                    Err(CgosError::Error)
                }
            };
        };

        match kind {
            RecordKind::MapList => Ok(Self::MapList(MapTable::from_raw(base))),
            RecordKind::BoardInfo => {
                // O primeiro u32 declara o tamanho; truncamos no layout conhecido
                let declared = ptr::read_unaligned(optr.cast::<u32>()) as usize;
                let len = declared.clamp(4, BOARD_INFO_SIZE);
                let mut raw = core::slice::from_raw_parts(optr, len).to_vec();
                // O tamanho embutido passa a descrever o que foi copiado
                raw[..4].copy_from_slice(&(len as u32).to_le_bytes());
                Ok(Self::BoardInfo(BoardRecord { raw }))
            }
            RecordKind::StorageInfo => {
                let raw = core::slice::from_raw_parts(optr, STORAGE_INFO_SIZE);
                Ok(Self::StorageInfo(StorageRecord {
                    kind: le_u32(raw, 4).unwrap_or(0),
                    flags: le_u32(raw, 8).unwrap_or(0),
                    size: le_u32(raw, 12).unwrap_or(0),
                    block_size: le_u32(raw, 16).unwrap_or(0),
                }))
            }
            RecordKind::I2cInfo => {
                let raw = core::slice::from_raw_parts(optr, I2C_INFO_SIZE);
                Ok(Self::I2cInfo(I2cRecord {
                    kind: le_u32(raw, 4).unwrap_or(0),
                    frequency: le_u32(raw, 8).unwrap_or(0),
                    max_frequency: le_u32(raw, 12).unwrap_or(0),
                }))
            }
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// u32 little-endian em `bytes[offset..offset+4]`
pub fn le_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let chunk = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

/// String ASCII de tamanho fixo, cortada no primeiro NUL.
pub fn ascii_field(bytes: &[u8]) -> &str {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    match core::str::from_utf8(&bytes[..end]) {
        Ok(s) => s.trim_end(),
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
    }
}
