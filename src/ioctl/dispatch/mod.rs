//! # Dispatcher IOCTL
//!
//! Máquina de estados de uma requisição:
//!
//! ```text
//! VALIDATE ──► RESOLVE ──► DISPATCH ──► SUCCESS
//!    │            │            │
//!    └────────────┴────────────┴──────► FAILED
//! ```
//!
//! - VALIDATE: código de controle, tamanhos dos cabeçalhos, opcode na tabela
//! - RESOLVE: caudas mínimas, handle, `TYPE_ZERO`, unidade
//! - DISPATCH: handler local, firmware, stub ou `NotImplemented`
//!
//! Todos os campos da requisição são lidos antes de qualquer byte da resposta
//! ser escrito.

pub mod table;

pub use table::{Action, FwCall, InputShape, LocalHandler, OpEntry, OpFlags, UnitClass, OP_TABLE};

use super::abi::{Request, Response, CGOS_IOCTL, RESPONSE_HEADER_LEN};
use super::error::{CgosError, CgosResult, CGOS_SUCCESS};
use crate::board::resolve as units;
use crate::board::{Board, BoardRegistry, StorageArea};
use crate::cgeb::fps::FPS_MAX_XPARS;
use crate::cgeb::{FirmwareContext, InvokeFlags, OutputShape};
use alloc::vec::Vec;
use spin::MutexGuard;

/// Até onde a requisição chegou.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Rejeitada antes do dispatch
    Validation,
    /// Tratada pelo driver sem chamar o firmware
    Local,
    /// O firmware foi chamado (com sucesso ou não)
    Firmware,
}

/// Resultado de uma requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgosReply {
    /// Status escrito no envelope
    pub status: i32,
    pub rets: [u32; 2],
    /// Bytes válidos na cauda de saída
    pub written: usize,
    pub origin: Origin,
}

impl CgosReply {
    fn rejected(err: CgosError) -> Self {
        Self {
            status: err.as_status(),
            rets: [0; 2],
            written: 0,
            origin: Origin::Validation,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CGOS_SUCCESS
    }

    pub fn error(&self) -> Option<CgosError> {
        CgosError::from_status(self.status)
    }

    /// Tamanho total da resposta (cabeçalho + cauda)
    pub fn response_len(&self) -> usize {
        RESPONSE_HEADER_LEN + self.written
    }
}

// =============================================================================
// CHAMADA EM ANDAMENTO
// =============================================================================

/// Estado de uma requisição entre RESOLVE e o fim do DISPATCH.
pub struct Call<'a> {
    pub req: Request,
    /// Cauda de entrada
    pub input: &'a [u8],
    /// Cauda de saída
    pub output: &'a mut [u8],
    pub registry: &'a BoardRegistry,
    board: Option<&'a Board>,
    /// Unidade já resolvida para o firmware
    pub unit: u32,
    /// Storage area resolvida
    pub area: Option<StorageArea>,
    pub rets: [u32; 2],
    pub written: usize,
    pub origin: Origin,
}

impl<'a> Call<'a> {
    fn new(req: Request, input: &'a [u8], output: &'a mut [u8], registry: &'a BoardRegistry) -> Self {
        Self {
            req,
            input,
            output,
            registry,
            board: None,
            unit: req.unit,
            area: None,
            rets: [0; 2],
            written: 0,
            origin: Origin::Validation,
        }
    }

    pub fn board(&self) -> CgosResult<&'a Board> {
        self.board.ok_or(CgosError::InvalidParameter)
    }

    /// Trava o firmware da board e marca a origem.
    pub fn firmware(&mut self) -> CgosResult<MutexGuard<'a, FirmwareContext>> {
        let board = self.board()?;
        self.origin = Origin::Firmware;
        Ok(board.firmware())
    }

    pub fn area(&self) -> CgosResult<StorageArea> {
        self.area.ok_or(CgosError::InvalidParameter)
    }

    /// Copia `bytes` para a cauda (limitado à capacidade).
    pub fn write_tail(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.output.len());
        self.output[..n].copy_from_slice(&bytes[..n]);
        self.written = n;
        n
    }

    /// String terminada em NUL, truncada se preciso.
    pub fn write_str(&mut self, s: &str) {
        let Some(room) = self.output.len().checked_sub(1) else {
            self.written = 0;
            return;
        };
        let n = s.len().min(room);
        self.output[..n].copy_from_slice(&s.as_bytes()[..n]);
        self.output[n] = 0;
        self.written = n + 1;
    }

    fn finish(self, result: CgosResult<()>) -> CgosReply {
        match result {
            Ok(()) => CgosReply {
                status: CGOS_SUCCESS,
                rets: self.rets,
                written: self.written,
                origin: self.origin,
            },
            Err(err) => CgosReply {
                status: err.as_status(),
                rets: [0; 2],
                written: 0,
                origin: self.origin,
            },
        }
    }
}

// =============================================================================
// MÁQUINA DE ESTADOS
// =============================================================================

/// Processa uma requisição contra `table`.
pub fn run(
    table: &[OpEntry],
    registry: &BoardRegistry,
    code: u32,
    input: &[u8],
    output: &mut [u8],
) -> CgosReply {
    let Some((header, tail)) = output.split_first_chunk_mut::<RESPONSE_HEADER_LEN>() else {
        crate::kdebug!("(IOCTL) Saída menor que o cabeçalho");
        return CgosReply::rejected(CgosError::InvalidParameter);
    };

    let reply = match validate(table, code, input) {
        Ok((req, entry, in_tail)) => {
            let mut call = Call::new(req, in_tail, tail, registry);
            let result = resolve(entry, &mut call).and_then(|()| execute(entry, &mut call));
            call.finish(result)
        }
        Err(err) => CgosReply::rejected(err),
    };

    *header = Response {
        status: reply.status,
        rets: reply.rets,
    }
    .to_bytes();
    reply
}

fn validate<'t, 'i>(
    table: &'t [OpEntry],
    code: u32,
    input: &'i [u8],
) -> CgosResult<(Request, &'t OpEntry, &'i [u8])> {
    if code != CGOS_IOCTL {
        crate::kdebug!("(IOCTL) Código de controle desconhecido=", code);
        return Err(CgosError::InvalidParameter);
    }
    let (req, tail) = Request::decode(input)?;

    let Some(entry) = table.get(req.opcode as usize) else {
        return Err(CgosError::NotImplemented);
    };
    if entry.opcode != req.opcode {
        crate::kerror!("(IOCTL) Entrada da tabela inconsistente opcode=", req.opcode);
        return Err(CgosError::NotImplemented);
    }
    Ok((req, entry, tail))
}

fn resolve(entry: &OpEntry, call: &mut Call<'_>) -> CgosResult<()> {
    if call.input.len() < entry.min_in || call.output.len() < entry.min_out {
        return Err(CgosError::InvalidParameter);
    }
    // O firmware não pode ser mandado ler além da cauda
    let input = call.input;
    let Some(declared) = entry.input.declared(&call.req.pars, input) else {
        crate::kdebug!("(IOCTL) Entrada declarada maior que a cauda");
        return Err(CgosError::InvalidParameter);
    };
    call.input = &input[..declared];

    // Handle 0 é "nenhum"; qualquer outro precisa existir
    call.board = call.registry.get(call.req.handle);
    if call.board.is_none() && (call.req.handle != 0 || !entry.flags.contains(OpFlags::NO_HANDLE)) {
        return Err(CgosError::InvalidParameter);
    }
    if entry.flags.contains(OpFlags::TYPE_ZERO) && call.req.unit != 0 {
        return Err(CgosError::InvalidParameter);
    }

    let unit = call.req.unit;
    match entry.class {
        UnitClass::None | UnitClass::Vga | UnitClass::Io => {}
        UnitClass::Storage => {
            let area = units::storage(call.board()?.storage_areas(), unit)
                .copied()
                .ok_or(CgosError::InvalidParameter)?;
            call.unit = area.index;
            call.area = Some(area);
        }
        UnitClass::I2c => {
            let board = call.board()?;
            let (class, _) = units::split_unit(unit);
            let bus = if class == 0 {
                units::i2c_index(board.i2c_count(), unit)
            } else {
                units::i2c(&mut *call.firmware()?, board.i2c_count(), unit)?
            };
            call.unit = bus.ok_or(CgosError::InvalidParameter)?;
        }
        UnitClass::Wdog => {
            call.unit = units::watchdog(call.board()?.wdog_count(), unit).ok_or(CgosError::InvalidParameter)?;
        }
    }
    Ok(())
}

fn execute(entry: &OpEntry, call: &mut Call<'_>) -> CgosResult<()> {
    if call.origin == Origin::Validation {
        call.origin = Origin::Local;
    }
    match entry.action {
        Action::Local(handler) => handler(call),
        Action::Firmware { fct, call: shape } => pass_through(fct, shape, call),
        Action::Stub => Ok(()),
        Action::NotImplemented => Err(CgosError::NotImplemented),
    }
}

/// Passagem direta ao firmware.
fn pass_through(fct: u32, shape: FwCall, call: &mut Call<'_>) -> CgosResult<()> {
    let unit = call.unit;
    let pars = call.req.pars;

    match shape {
        FwCall::Par(flags) => {
            let reply = call.firmware()?.invoke_par(fct, unit, pars, flags)?;
            call.rets = reply.rets;
            if flags.intersects(InvokeFlags::RETS0 | InvokeFlags::STATUS) {
                call.rets[0] = reply.value;
            }
        }
        FwCall::Envelope(out) => {
            // O firmware escreve direto na cauda: o tamanho pedido precisa caber
            if let OutputShape::CountInPar(i) = out {
                let wanted = pars.get(i).copied().unwrap_or(0) as usize;
                if wanted > call.output.len() {
                    return Err(CgosError::InvalidParameter);
                }
            }
            let mut fw = call.firmware()?;
            let reply = fw.invoke_envelope(fct, unit, pars, call.input, &mut call.output[..], out)?;
            call.rets = reply.rets;
            call.written = reply.written;
        }
        FwCall::Bulk { echo } => {
            // Só palavras inteiras
            if call.input.len() % 4 != 0 {
                return Err(CgosError::InvalidParameter);
            }
            let mut xpars: Vec<u32> = call
                .input
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            if xpars.len() > FPS_MAX_XPARS {
                return Err(CgosError::InvalidParameter);
            }
            let flags = if echo { InvokeFlags::ECHO } else { InvokeFlags::empty() };
            call.rets = call.firmware()?.invoke_bulk(fct, unit, &mut xpars, flags)?;
            if echo {
                let bytes: Vec<u8> = xpars.iter().flat_map(|w| w.to_le_bytes()).collect();
                call.write_tail(&bytes);
            }
        }
    }
    Ok(())
}
