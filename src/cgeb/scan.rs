//! # Busca de Descritores por Assinatura
//!
//! Os descritores CGEB começam com uma assinatura de 8 bytes alinhada em 16.
//! A busca compara duas palavras de 32 bits por candidato e nunca lê além do
//! fim declarado da janela.
//!
//! Toda leitura da janela é volátil: a memória pertence ao firmware (ROM ou
//! shadow RAM) e não pode ser "otimizada" pelo compilador.

use core::ptr::NonNull;
use volatile::VolatilePtr;

/// Alinhamento dos descritores
pub const SCAN_ALIGN: usize = 16;

/// Visão somente-leitura de uma janela de memória mapeada.
#[derive(Debug, Clone, Copy)]
pub struct MemView {
    base: NonNull<u8>,
    len: usize,
}

impl MemView {
    /// Cria uma visão sobre `[base, base + len)`.
    ///
    /// # Safety
    ///
    /// A região inteira deve estar mapeada e legível enquanto a visão existir.
    pub unsafe fn new(base: NonNull<u8>, len: usize) -> Self {
        Self { base, len }
    }

    /// Visão sobre um slice (memória comum).
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            base: NonNull::from(bytes).cast::<u8>(),
            len: bytes.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Lê um byte. `None` se fora da janela.
    #[inline]
    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        if offset >= self.len {
            return None;
        }
        // SAFETY: offset < len e a janela é legível (contrato de `new`).
        let byte = unsafe {
            let ptr = NonNull::new_unchecked(self.base.as_ptr().add(offset));
            VolatilePtr::new_read_only(ptr).read()
        };
        Some(byte)
    }

    /// Lê um u16 little-endian (sem exigir alinhamento).
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let lo = self.read_u8(offset)?;
        let hi = self.read_u8(offset.checked_add(1)?)?;
        Some(u16::from_le_bytes([lo, hi]))
    }

    /// Lê um u32 little-endian (sem exigir alinhamento).
    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        let end = offset.checked_add(4)?;
        if end > self.len {
            return None;
        }
        let mut bytes = [0u8; 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.read_u8(offset + i)?;
        }
        Some(u32::from_le_bytes(bytes))
    }

    /// Copia `dst.len()` bytes a partir de `offset`. `false` se não couber.
    pub fn copy_to(&self, offset: usize, dst: &mut [u8]) -> bool {
        match offset.checked_add(dst.len()) {
            Some(end) if end <= self.len => {}
            _ => return false,
        }
        for (i, b) in dst.iter_mut().enumerate() {
            match self.read_u8(offset + i) {
                Some(v) => *b = v,
                None => return false,
            }
        }
        true
    }
}

/// Divide a assinatura em duas palavras de 32 bits.
#[inline]
fn magic_words(magic: &[u8; 8]) -> (u32, u32) {
    (
        u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]),
        u32::from_le_bytes([magic[4], magic[5], magic[6], magic[7]]),
    )
}

/// Procura `magic` em offsets múltiplos de 16.
///
/// Retorna o offset do primeiro candidato cujos 8 bytes estão inteiramente
/// dentro da janela e coincidem com a assinatura.
pub fn find_magic(mem: &MemView, magic: &[u8; 8]) -> Option<usize> {
    let (magic0, magic1) = magic_words(magic);
    let mut offset = 0usize;

    while offset.checked_add(magic.len())? <= mem.len() {
        if mem.read_u32(offset)? == magic0 && mem.read_u32(offset + 4)? == magic1 {
            return Some(offset);
        }
        offset += SCAN_ALIGN;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC: &[u8; 8] = b"$CGEBLD$";

    #[test]
    fn test_finds_magic_at_every_aligned_offset() {
        for slot in 0..16 {
            let mut buf = vec![0u8; 256];
            let at = slot * SCAN_ALIGN;
            buf[at..at + 8].copy_from_slice(MAGIC);
            assert_eq!(find_magic(&MemView::from_slice(&buf), MAGIC), Some(at));
        }
    }

    #[test]
    fn test_ignores_unaligned_match() {
        let mut buf = vec![0u8; 128];
        buf[20..28].copy_from_slice(MAGIC);
        assert_eq!(find_magic(&MemView::from_slice(&buf), MAGIC), None);
    }

    #[test]
    fn test_absent_magic() {
        let buf = vec![0xFFu8; 4096];
        assert_eq!(find_magic(&MemView::from_slice(&buf), MAGIC), None);
    }

    #[test]
    fn test_half_signature_is_not_a_match() {
        let mut buf = vec![0u8; 64];
        buf[32..36].copy_from_slice(&MAGIC[..4]);
        assert_eq!(find_magic(&MemView::from_slice(&buf), MAGIC), None);
    }

    #[test]
    fn test_never_reads_past_declared_end() {
        // Assinatura completa no buffer, mas a janela declarada termina no
        // meio dela.
        let mut buf = vec![0u8; 64];
        buf[48..56].copy_from_slice(MAGIC);
        let view = MemView::from_slice(&buf[..52]);
        assert_eq!(find_magic(&view, MAGIC), None);

        // Janela exatamente até o fim da assinatura: encontrada.
        let view = MemView::from_slice(&buf[..56]);
        assert_eq!(find_magic(&view, MAGIC), Some(48));
    }

    #[test]
    fn test_unaligned_field_reads() {
        let buf = [0x11u8, 0x22, 0x33, 0x44, 0x55];
        let view = MemView::from_slice(&buf);
        assert_eq!(view.read_u32(1), Some(0x5544_3322));
        assert_eq!(view.read_u16(3), Some(0x5544));
        assert_eq!(view.read_u32(2), None);
        assert_eq!(view.read_u8(5), None);
    }
}
