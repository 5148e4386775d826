//! # Motor de Chamadas (Loop de Continuação)
//!
//! Uma chamada CGEB é uma sequência de passos sobre o mesmo `Fps`. Depois de
//! cada passo o firmware deixa em `status` o que o driver deve fazer:
//!
//! | Status        | Ação                                         |
//! |---------------|----------------------------------------------|
//! | SUCCESS       | fim                                          |
//! | NEXT          | chamar de novo                               |
//! | NOIRQS        | ceder o quantum, chamar de novo              |
//! | DELAY         | esperar `rets[0]` µs, chamar de novo         |
//! | DBG_STR/HEX/DEC | registrar a mensagem, chamar de novo       |
//! | outro positivo | `Error` (não entra em loop)                 |
//! | negativo      | falha terminal, código repassado sem alteração |
//!
//! Não há cancelamento: a chamada roda até um estado terminal.

use super::entry::FirmwareEntry;
use super::fps::{Continuation, Fps, FpsExt, CGEB_SUCCESS};
use crate::core::config::{Verbosity, MAX_DEBUG_STRING};
use crate::hal::Delay;
use crate::ioctl::error::{CgosError, CgosResult};

/// Limite entre espera ativa e sleep
pub const SPIN_LIMIT_US: u32 = 1000;

/// Ambiente de uma chamada: quem executar e como esperar.
pub struct CallEnv<'a, D: Delay + ?Sized> {
    pub entry: &'a dyn FirmwareEntry,
    pub delay: &'a D,
    /// Área de dados privada do firmware (nula antes do handshake)
    pub data: *mut u8,
    pub data_segment: u16,
    pub verbosity: Verbosity,
}

/// Contadores de uma chamada completa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Passos executados no firmware
    pub invocations: u32,
    /// Esperas (spin ou sleep) pedidas via DELAY
    pub delays: u32,
    /// Cessões de CPU pedidas via NOIRQS
    pub yields: u32,
}

/// Executa a chamada descrita por `fps` até um estado terminal.
pub fn call<D: Delay + ?Sized>(env: &CallEnv<'_, D>, fps: &mut Fps) -> CgosResult<StepReport> {
    let mut report = StepReport::default();
    call_counted(env, fps, &mut report)?;
    Ok(report)
}

/// Como `call`, mas os contadores ficam em `report` também quando a
/// chamada falha.
pub fn call_counted<D: Delay + ?Sized>(
    env: &CallEnv<'_, D>,
    fps: &mut Fps,
    report: &mut StepReport,
) -> CgosResult<()> {
    // SAFETY: `fps` é uma referência exclusiva a um Fps completo.
    unsafe { step_loop(env, fps as *mut Fps, report) }
}

/// Executa a chamada sobre um FPS estendido.
pub fn call_ext<D: Delay + ?Sized>(env: &CallEnv<'_, D>, ext: &mut FpsExt) -> CgosResult<StepReport> {
    // SAFETY: FpsExt é repr(C) com o Fps no offset 0; o ponteiro cobre a
    // estrutura inteira, então o firmware pode ler `xpars`.
    unsafe { call_raw(env, (ext as *mut FpsExt).cast::<Fps>()) }
}

/// Loop de continuação sobre um registro cru.
///
/// # Safety
///
/// `fps` deve apontar para um registro válido de pelo menos `(*fps).size`
/// bytes, exclusivo durante a chamada.
pub unsafe fn call_raw<D: Delay + ?Sized>(env: &CallEnv<'_, D>, fps: *mut Fps) -> CgosResult<StepReport> {
    let mut report = StepReport::default();
    step_loop(env, fps, &mut report)?;
    Ok(report)
}

/// # Safety
///
/// Mesmas condições de `call_raw`.
unsafe fn step_loop<D: Delay + ?Sized>(
    env: &CallEnv<'_, D>,
    fps: *mut Fps,
    report: &mut StepReport,
) -> CgosResult<()> {
    // Nada é tocado no registro antes destas verificações
    if !env.entry.is_present() {
        crate::kerror!("(CGEB) Ponto de entrada nulo");
        return Err(CgosError::Error);
    }
    if (*fps).size < Fps::BASE_SIZE {
        return Err(CgosError::InvalidParameter);
    }

    // Primeiro passo
    (*fps).data.off = env.data as usize;
    (*fps).data.seg = env.data_segment;
    (*fps).cont = 0;
    (*fps).subfps = 0;
    (*fps).subfct = 0;
    (*fps).status = CGEB_SUCCESS;

    if env.verbosity >= Verbosity::Calls {
        crate::kinfo!("(CGEB) Chamada fct=", dec (*fps).fct);
    }

    loop {
        report.invocations += 1;
        env.entry.invoke(fps);

        let status = (*fps).status;
        if env.verbosity >= Verbosity::Steps {
            crate::kinfo!("(CGEB) Passo status=", status);
        }

        match Continuation::decode(status) {
            Continuation::Success => return Ok(()),
            Continuation::Next => {}
            Continuation::NoIrqs => {
                report.yields += 1;
                env.delay.yield_now();
            }
            Continuation::Delay => {
                report.delays += 1;
                let us = (*fps).rets[0];
                if us < SPIN_LIMIT_US {
                    env.delay.udelay(us);
                } else {
                    env.delay.msleep(us.div_ceil(1000));
                }
            }
            Continuation::DebugString => {
                if env.verbosity >= Verbosity::Calls {
                    log_firmware_string((*fps).optr);
                }
            }
            Continuation::DebugHex => {
                if env.verbosity >= Verbosity::Calls {
                    crate::kinfo!("(CGEB) fw: ", (*fps).rets[0]);
                }
            }
            Continuation::DebugDec => {
                if env.verbosity >= Verbosity::Calls {
                    crate::kinfo!("(CGEB) fw: ", dec (*fps).rets[0]);
                }
            }
            Continuation::Unknown(code) => {
                crate::kwarn!("(CGEB) Continuação desconhecida=", code);
                return Err(CgosError::Error);
            }
            Continuation::Failed(code) => {
                if env.verbosity >= Verbosity::Calls {
                    crate::kinfo!("(CGEB) Falha do firmware=", dec code);
                }
                return Err(CgosError::from_status(code).unwrap_or(CgosError::Error));
            }
        }
    }
}

/// Registra uma string de debug do firmware (no máximo MAX_DEBUG_STRING bytes).
///
/// # Safety
///
/// `optr`, se não-nulo, aponta para uma string terminada em NUL ou para pelo
/// menos MAX_DEBUG_STRING bytes legíveis.
#[cfg(any(feature = "log_info", feature = "log_debug", feature = "log_trace"))]
unsafe fn log_firmware_string(optr: *const u8) {
    if optr.is_null() {
        return;
    }
    let mut buf = [0u8; MAX_DEBUG_STRING];
    let mut len = 0;
    while len < MAX_DEBUG_STRING {
        let b = core::ptr::read_volatile(optr.add(len));
        if b == 0 {
            break;
        }
        buf[len] = b;
        len += 1;
    }
    let text = match core::str::from_utf8(&buf[..len]) {
        Ok(s) => s,
        Err(e) => core::str::from_utf8(&buf[..e.valid_up_to()]).unwrap_or(""),
    };
    crate::kinfo!("(CGEB) fw: ", str text);
}

/// Sem INFO compilado, a string nem é lida.
#[cfg(not(any(feature = "log_info", feature = "log_debug", feature = "log_trace")))]
unsafe fn log_firmware_string(_optr: *const u8) {}
