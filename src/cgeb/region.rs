//! Regiões de memória próprias do driver.
//!
//! O código relocado e a área de dados do firmware são escritos pelo próprio
//! firmware durante as chamadas, então ficam fora do modelo de empréstimos:
//! uma alocação crua, zerada e alinhada, liberada no `Drop`.

use crate::ioctl::error::{CgosError, CgosResult};
use core::alloc::Layout;
use core::ptr::NonNull;

/// Alinhamento da área de dados
pub const DATA_ALIGN: usize = 16;

/// Alinhamento do código relocado (página, para `prepare_code`)
pub const CODE_ALIGN: usize = 4096;

/// Alocação crua zerada.
pub struct OwnedRegion {
    ptr: NonNull<u8>,
    layout: Layout,
    len: usize,
}

// SAFETY: a região é exclusiva do contexto dono; o acesso é serializado pelo
// mutex da board.
unsafe impl Send for OwnedRegion {}

impl OwnedRegion {
    /// Aloca `len` bytes zerados com o alinhamento pedido.
    pub fn zeroed(len: usize, align: usize) -> CgosResult<Self> {
        // Alocação de tamanho zero não é permitida
        let size = len.max(align);
        let layout = Layout::from_size_align(size, align).map_err(|_| CgosError::InvalidParameter)?;

        // SAFETY: layout tem tamanho não-nulo.
        let raw = unsafe { alloc::alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            crate::kerror!("(CGEB) Falha ao alocar região=", size);
            return Err(CgosError::Error);
        };

        Ok(Self { ptr, layout, len })
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    #[inline]
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Tamanho pedido (a alocação pode ser maior)
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Conteúdo atual da região.
    ///
    /// Só pode ser usado fora de uma chamada ao firmware.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: ptr é válido para `len` bytes e `&mut self` garante
        // exclusividade do lado Rust.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for OwnedRegion {
    fn drop(&mut self) {
        // SAFETY: ptr veio de alloc_zeroed com este layout.
        unsafe { alloc::alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}
