//! # Ponto de Entrada do Firmware
//!
//! Interface estreita "invoque o firmware com o registro R". Cada convenção de
//! chamada suportada tem uma implementação em `arch::*`; o resto do motor não
//! sabe nada de registradores ou segmentos.

use super::fps::Fps;

/// Um passo de execução do firmware.
pub trait FirmwareEntry: Send + Sync {
    /// Endereço do ponto de entrada (0 = ausente).
    fn address(&self) -> usize;

    /// Executa um passo do firmware sobre o registro apontado por `fps`.
    ///
    /// # Safety
    ///
    /// - `fps` deve apontar para um `Fps` (ou `FpsExt`) válido e exclusivo
    ///   durante a chamada, com `size` descrevendo o tamanho real.
    /// - Os ponteiros `data`, `iptr` e `optr` do registro devem ser válidos
    ///   para o firmware.
    unsafe fn invoke(&self, fps: *mut Fps);

    /// `true` se o ponto de entrada pode ser chamado
    #[inline]
    fn is_present(&self) -> bool {
        self.address() != 0
    }
}
