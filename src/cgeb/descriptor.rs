//! # Descoberta do Firmware
//!
//! O BIOS deixa dois descritores em memória física:
//!
//! ```text
//! Janela baixa (0xC0000, 256 KiB)        Janela alta (dica .. 4 GiB)
//! +-----------+------+------+---------+  +-----------+------+------+-----------+-----------+-----------+
//! | $CGEBLD$  | size | rsvd | bios[8] |  | $CGEBQD$  | size | rsvd | data_size | code_size | entry_rel |
//! | hi_desc_phys (u32)                |  +-----------+------+------+-----------+-----------+-----------+
//! +-----------------------------------+  | código ...                                                  |
//! ```
//!
//! O blob de código começa no próprio descritor alto e é copiado inteiro para
//! uma região do driver antes de soltar a janela: nada da memória do firmware
//! é referenciado depois da descoberta.

use super::region::{OwnedRegion, CODE_ALIGN};
use super::scan::{find_magic, MemView};
use crate::core::config::{DriverConfig, ADDRESS_SPACE_TOP};
use crate::hal::{PhysMemory, PhysWindow};
use crate::ioctl::error::{CgosError, CgosResult};

/// Assinatura do descritor baixo
pub const LOW_MAGIC: &[u8; 8] = b"$CGEBLD$";

/// Assinatura do descritor alto (blob 64-bit)
#[cfg(target_pointer_width = "64")]
pub const HIGH_MAGIC: &[u8; 8] = b"$CGEBQD$";

/// Assinatura do descritor alto (blob 32-bit)
#[cfg(not(target_pointer_width = "64"))]
pub const HIGH_MAGIC: &[u8; 8] = b"$CGEBHD$";

// Layout do descritor baixo
const LOW_SIZE_OFF: usize = 8;
const LOW_BIOS_NAME_OFF: usize = 12;
const LOW_HINT_OFF: usize = 20;
/// `size` mínimo para a dica ser válida
const LOW_HINT_END: u16 = 24;

// Layout do descritor alto
const HIGH_SIZE_OFF: usize = 8;
const HIGH_DATA_SIZE_OFF: usize = 12;
const HIGH_CODE_SIZE_OFF: usize = 16;
const HIGH_ENTRY_OFF: usize = 20;
/// Cabeçalho mínimo do descritor alto
pub const HIGH_HEADER_LEN: usize = 24;

// =============================================================================
// DESCRITORES
// =============================================================================

/// Descritor baixo ("$CGEBLD$").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowDescriptor {
    pub size: u16,
    pub bios_name: [u8; 8],
    pub hi_desc_phys: u32,
}

impl LowDescriptor {
    /// Lê o descritor em `offset`.
    pub fn parse(mem: &MemView, offset: usize) -> Option<Self> {
        let size = mem.read_u16(offset + LOW_SIZE_OFF)?;
        let mut bios_name = [0u8; 8];
        if !mem.copy_to(offset + LOW_BIOS_NAME_OFF, &mut bios_name) {
            return None;
        }
        // A dica só existe se o tamanho declarado a cobre
        let hi_desc_phys = if size >= LOW_HINT_END {
            mem.read_u32(offset + LOW_HINT_OFF).unwrap_or(0)
        } else {
            0
        };
        Some(Self {
            size,
            bios_name,
            hi_desc_phys,
        })
    }

    /// Onde começar a procurar o descritor alto.
    pub fn high_window_base(&self, default: u64) -> u64 {
        if self.hi_desc_phys != 0 {
            self.hi_desc_phys as u64
        } else {
            default
        }
    }
}

/// Descritor alto ("$CGEBQD$" / "$CGEBHD$").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighDescriptor {
    pub size: u16,
    pub data_size: u32,
    pub code_size: u32,
    pub entry_rel: u32,
}

impl HighDescriptor {
    pub fn parse(mem: &MemView, offset: usize) -> Option<Self> {
        Some(Self {
            size: mem.read_u16(offset + HIGH_SIZE_OFF)?,
            data_size: mem.read_u32(offset + HIGH_DATA_SIZE_OFF)?,
            code_size: mem.read_u32(offset + HIGH_CODE_SIZE_OFF)?,
            entry_rel: mem.read_u32(offset + HIGH_ENTRY_OFF)?,
        })
    }

    /// Valida o descritor encontrado em `offset` de uma janela de `window_len`.
    pub fn validate(&self, offset: usize, window_len: usize) -> CgosResult<()> {
        let code_size = self.code_size as usize;
        let fits = offset
            .checked_add(code_size)
            .is_some_and(|end| end <= window_len);

        if code_size < HIGH_HEADER_LEN || !fits {
            crate::kerror!("(CGEB) code_size inválido=", self.code_size);
            return Err(CgosError::Error);
        }
        if self.entry_rel >= self.code_size {
            crate::kerror!("(CGEB) entry_rel fora do código=", self.entry_rel);
            return Err(CgosError::Error);
        }
        Ok(())
    }
}

// =============================================================================
// DESCOBERTA
// =============================================================================

/// Resultado da descoberta.
pub struct Discovered {
    /// Cópia do blob (começando no descritor alto)
    pub code: OwnedRegion,
    /// Tamanho da área de dados pedido (0 = perguntar ao firmware)
    pub data_size: u32,
    /// Offset do ponto de entrada dentro de `code`
    pub entry_rel: u32,
    /// Endereço físico do descritor alto
    pub phys: u64,
    pub bios_name: [u8; 8],
}

/// Localiza os descritores e reloca o código.
///
/// As duas janelas temporárias são desfeitas em qualquer saída.
pub fn discover<M: PhysMemory + ?Sized>(mem: &M, config: &DriverConfig) -> CgosResult<Discovered> {
    // --- Descritor baixo ---
    let low = {
        let window = PhysWindow::map(mem, config.low_window_base, config.low_window_len)?;
        // SAFETY: a janela está mapeada enquanto `window` existir.
        let view = unsafe { MemView::new(window.virt(), window.len()) };

        let Some(offset) = find_magic(&view, LOW_MAGIC) else {
            crate::kwarn!("(CGEB) Descritor baixo não encontrado");
            return Err(CgosError::NotFound);
        };
        LowDescriptor::parse(&view, offset).ok_or(CgosError::NotFound)?
    };

    // --- Descritor alto ---
    let base = low.high_window_base(config.high_window_default);
    if base >= ADDRESS_SPACE_TOP {
        return Err(CgosError::InvalidParameter);
    }
    let len = (ADDRESS_SPACE_TOP - base) as usize;
    crate::kdebug!("(CGEB) Janela alta base=", base);

    let window = PhysWindow::map(mem, base, len)?;
    // SAFETY: idem.
    let view = unsafe { MemView::new(window.virt(), window.len()) };

    let Some(offset) = find_magic(&view, HIGH_MAGIC) else {
        crate::kwarn!("(CGEB) Descritor alto não encontrado");
        return Err(CgosError::NotFound);
    };
    let high = HighDescriptor::parse(&view, offset).ok_or(CgosError::NotFound)?;
    high.validate(offset, view.len())?;

    // --- Relocação ---
    let mut code = OwnedRegion::zeroed(high.code_size as usize, CODE_ALIGN)?;
    if !view.copy_to(offset, code.bytes_mut()) {
        return Err(CgosError::ReadError);
    }

    crate::kinfo!("(CGEB) Firmware encontrado phys=", base + offset as u64);

    Ok(Discovered {
        code,
        data_size: high.data_size,
        entry_rel: high.entry_rel,
        phys: base + offset as u64,
        bios_name: low.bios_name,
    })
}
