//! # Marshalling de Parâmetros
//!
//! Formas de chamada sobre o motor de continuação. Cada forma monta o `Fps`,
//! roda a chamada e devolve o resultado já interpretado:
//!
//! | Forma             | Entrada                  | Saída                          |
//! |-------------------|--------------------------|--------------------------------|
//! | `invoke_plain`    | nada                     | 1, `rets[0]` ou status         |
//! | `invoke_unit`     | unidade                  | 1, `rets[0]` ou status         |
//! | `invoke_record`   | unidade                  | `FwRecord` decodificado        |
//! | `invoke_par`      | unidade + 4 escalares    | valor + `rets`                 |
//! | `invoke_envelope` | escalares + buffer       | `rets` + bytes no buffer       |
//! | `invoke_bulk`     | até 16 escalares extras  | `rets` (+ eco dos escalares)   |

use super::context::FirmwareContext;
use super::engine::{self, StepReport};
use super::fps::{Fps, FpsExt, FPS_MAX_XPARS};
use super::reply::{le_u32, FwRecord, RecordKind};
use crate::ioctl::error::{CgosError, CgosResult};
use bitflags::bitflags;
use core::ptr;

bitflags! {
    /// O que extrair de uma chamada.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InvokeFlags: u32 {
        /// Valor = `rets[0]`
        const RETS0  = 1 << 0;
        /// Valor = status bruto (status negativo vira valor, não erro)
        const STATUS = 1 << 1;
        /// Resultado é um registro apontado por `optr`
        const OPTR   = 1 << 2;
        /// Copiar os escalares estendidos de volta ao chamador
        const ECHO   = 1 << 3;
    }
}

/// Onde está a quantidade de bytes produzida por uma função.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// Nenhum byte de saída
    Empty,
    /// Quantidade fixa
    Fixed(usize),
    /// Em `rets[0]`
    CountInRets0,
    /// No parâmetro de entrada `pars[i]`
    CountInPar(usize),
    /// No primeiro u32 do próprio registro de saída
    EmbeddedLength,
}

/// Resultado de uma chamada escalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParReply {
    pub value: u32,
    pub rets: [u32; 2],
    pub report: StepReport,
}

/// Resultado de uma chamada com buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeReply {
    pub rets: [u32; 2],
    /// Bytes válidos no buffer de saída
    pub written: usize,
}

impl FirmwareContext {
    /// Roda `fps`; com STATUS uma falha do firmware vira valor.
    fn run(&mut self, fps: &mut Fps, flags: InvokeFlags) -> CgosResult<(StepReport, Option<i32>)> {
        let mut report = StepReport::default();
        match engine::call_counted(&self.env(), fps, &mut report) {
            Ok(()) => Ok((report, None)),
            Err(err) if flags.contains(InvokeFlags::STATUS) && fps.signed_status() < 0 => {
                Ok((report, Some(err.as_status())))
            }
            Err(err) => Err(err),
        }
    }

    fn value_of(fps: &Fps, flags: InvokeFlags, failed: Option<i32>) -> u32 {
        if flags.contains(InvokeFlags::STATUS) {
            failed.unwrap_or(fps.signed_status()) as u32
        } else if flags.contains(InvokeFlags::RETS0) {
            fps.rets[0]
        } else {
            1
        }
    }

    /// Chamada sem unidade nem parâmetros.
    pub fn invoke_plain(&mut self, fct: u32, flags: InvokeFlags) -> CgosResult<u32> {
        self.invoke_unit(fct, 0, flags)
    }

    /// Chamada com unidade.
    pub fn invoke_unit(&mut self, fct: u32, unit: u32, flags: InvokeFlags) -> CgosResult<u32> {
        Ok(self.invoke_par(fct, unit, [0; 4], flags)?.value)
    }

    /// Chamada cujo resultado é um registro em `optr`.
    pub fn invoke_record(&mut self, fct: u32, unit: u32, kind: RecordKind) -> CgosResult<FwRecord> {
        let mut fps = Fps::new(fct);
        fps.unit = unit;
        self.run(&mut fps, InvokeFlags::OPTR)?;
        // SAFETY: o firmware acabou de devolver `optr` para um registro `kind`.
        unsafe { FwRecord::decode(kind, fps.optr) }
    }

    /// Chamada com até 4 escalares.
    pub fn invoke_par(
        &mut self,
        fct: u32,
        unit: u32,
        pars: [u32; 4],
        flags: InvokeFlags,
    ) -> CgosResult<ParReply> {
        let mut fps = Fps::new(fct);
        fps.unit = unit;
        fps.pars = pars;

        let (report, failed) = self.run(&mut fps, flags)?;
        Ok(ParReply {
            value: Self::value_of(&fps, flags, failed),
            rets: fps.rets,
            report,
        })
    }

    /// Chamada com buffers de entrada e saída.
    ///
    /// Se o firmware devolver outro buffer em `optr`, os bytes são copiados
    /// para `output`. A quantidade vem de `shape` e é limitada à capacidade.
    pub fn invoke_envelope(
        &mut self,
        fct: u32,
        unit: u32,
        pars: [u32; 4],
        input: &[u8],
        output: &mut [u8],
        shape: OutputShape,
    ) -> CgosResult<EnvelopeReply> {
        let ours: *mut u8 = if output.is_empty() {
            ptr::null_mut()
        } else {
            output.as_mut_ptr()
        };

        let mut fps = Fps::new(fct);
        fps.unit = unit;
        fps.pars = pars;
        fps.iptr = if input.is_empty() {
            ptr::null()
        } else {
            input.as_ptr()
        };
        fps.optr = ours;

        self.run(&mut fps, InvokeFlags::empty())?;

        let theirs = fps.optr as *const u8;
        let foreign = !theirs.is_null() && theirs != ours as *const u8;

        let count = match shape {
            OutputShape::Empty => 0,
            OutputShape::Fixed(n) => n,
            OutputShape::CountInRets0 => fps.rets[0] as usize,
            OutputShape::CountInPar(i) => pars.get(i).copied().unwrap_or(0) as usize,
            OutputShape::EmbeddedLength if foreign => {
                // SAFETY: o registro do firmware começa com seu tamanho.
                unsafe { ptr::read_unaligned(theirs.cast::<u32>()) as usize }
            }
            OutputShape::EmbeddedLength => le_u32(output, 0).unwrap_or(0) as usize,
        };

        let written = count.min(output.len());
        if foreign && written > 0 {
            // SAFETY: o firmware garante `count` bytes em `optr`; written <= count.
            unsafe { ptr::copy_nonoverlapping(theirs, output.as_mut_ptr(), written) };
        }
        if shape == OutputShape::EmbeddedLength {
            clamp_embedded_length(output, count);
        }

        Ok(EnvelopeReply {
            rets: fps.rets,
            written,
        })
    }

    /// Chamada com até `FPS_MAX_XPARS` escalares extras.
    ///
    /// Com `ECHO`, os escalares (possivelmente alterados pelo firmware) voltam
    /// para `xpars`.
    pub fn invoke_bulk(
        &mut self,
        fct: u32,
        unit: u32,
        xpars: &mut [u32],
        flags: InvokeFlags,
    ) -> CgosResult<[u32; 2]> {
        if xpars.len() > FPS_MAX_XPARS {
            return Err(CgosError::InvalidParameter);
        }

        let mut ext = FpsExt::new(fct);
        ext.fps.unit = unit;
        ext.xcount = xpars.len() as u32;
        ext.xpars[..xpars.len()].copy_from_slice(xpars);

        engine::call_ext(&self.env(), &mut ext)?;

        if flags.contains(InvokeFlags::ECHO) {
            xpars.copy_from_slice(&ext.xpars[..xpars.len()]);
        }
        Ok(ext.fps.rets)
    }
}

/// Ajusta um registro com tamanho embutido que não coube no buffer.
///
/// Quando `count` excede a capacidade e há espaço para o cabeçalho, os 4
/// primeiros bytes passam a declarar o tamanho efetivamente escrito.
/// Devolve os bytes válidos.
pub fn clamp_embedded_length(output: &mut [u8], count: usize) -> usize {
    let written = count.min(output.len());
    if count > output.len() && output.len() >= 4 {
        output[..4].copy_from_slice(&(written as u32).to_le_bytes());
    }
    written
}
