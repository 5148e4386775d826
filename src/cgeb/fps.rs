//! # Function Parameter Structure (FPS)
//!
//! Registro de layout fixo trocado com o firmware a cada passo de uma chamada.
//! O firmware altera o registro no lugar: `status` indica se a chamada
//! terminou ou se o driver deve esperar, ceder a CPU ou chamar de novo.
//!
//! ```text
//! +--------+--------+-----------+------+--------+--------+--------+------+---------+---------+------+------+
//! | size   | fct    | data (far)| cont | subfps | subfct | status | unit | pars[4] | rets[2] | iptr | optr |
//! +--------+--------+-----------+------+--------+--------+--------+------+---------+---------+------+------+
//! ```

use core::mem::size_of;
use core::ptr;

// =============================================================================
// CÓDIGOS DE STATUS / CONTINUAÇÃO
// =============================================================================

/// Chamada concluída
pub const CGEB_SUCCESS: u32 = 0;
/// Chamar novamente de imediato
pub const CGEB_NEXT: u32 = 1;
/// Esperar `rets[0]` microssegundos e chamar novamente
pub const CGEB_DELAY: u32 = 2;
/// Ceder o quantum e chamar novamente
pub const CGEB_NOIRQS: u32 = 3;

/// Mensagem de debug: string apontada por `optr`
pub const CGEB_DBG_STR: u32 = 0x100;
/// Mensagem de debug: `rets[0]` em hexadecimal
pub const CGEB_DBG_HEX: u32 = 0x101;
/// Mensagem de debug: `rets[0]` em decimal
pub const CGEB_DBG_DEC: u32 = 0x102;

/// Número máximo de parâmetros extras no FPS estendido
pub const FPS_MAX_XPARS: usize = 16;

// =============================================================================
// ESTRUTURAS
// =============================================================================

/// Ponteiro "far": offset + seletor de segmento.
///
/// Em modo 64-bit o seletor é sempre 0 e o offset carrega o endereço completo.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FarPtr {
    pub off: usize,
    pub seg: u16,
    pub pad: u16,
}

/// Function Parameter Structure
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Fps {
    /// Tamanho do registro (>= size_of::<Fps>())
    pub size: u32,
    /// Número da função CGEB
    pub fct: u32,
    /// Área de dados privada do firmware
    pub data: FarPtr,
    /// Ponteiro de continuação privado do firmware
    pub cont: u32,
    /// Sub-FPS privado do firmware
    pub subfps: u32,
    /// Sub-função privada do firmware
    pub subfct: u32,
    /// Resultado / código de continuação
    pub status: u32,
    /// Número (ou tipo) da unidade
    pub unit: u32,
    /// Parâmetros de entrada
    pub pars: [u32; 4],
    /// Parâmetros de retorno
    pub rets: [u32; 2],
    /// Buffer de entrada
    pub iptr: *const u8,
    /// Buffer de saída (o firmware pode substituí-lo pelo seu próprio)
    pub optr: *mut u8,
}

impl Fps {
    /// Tamanho base do registro
    pub const BASE_SIZE: u32 = size_of::<Fps>() as u32;

    /// Registro vazio para a função `fct`
    pub const fn new(fct: u32) -> Self {
        Self {
            size: Self::BASE_SIZE,
            fct,
            data: FarPtr {
                off: 0,
                seg: 0,
                pad: 0,
            },
            cont: 0,
            subfps: 0,
            subfct: 0,
            status: CGEB_SUCCESS,
            unit: 0,
            pars: [0; 4],
            rets: [0; 2],
            iptr: ptr::null(),
            optr: ptr::null_mut(),
        }
    }

    /// Status interpretado como inteiro com sinal
    #[inline]
    pub fn signed_status(&self) -> i32 {
        self.status as i32
    }
}

/// FPS estendido: carrega parâmetros além dos 4 escalares do registro base.
///
/// O campo `fps.size` anuncia a extensão ao firmware.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FpsExt {
    pub fps: Fps,
    /// Quantidade de entradas válidas em `xpars`
    pub xcount: u32,
    pub xpars: [u32; FPS_MAX_XPARS],
}

impl FpsExt {
    pub const SIZE: u32 = size_of::<FpsExt>() as u32;

    pub const fn new(fct: u32) -> Self {
        let mut fps = Fps::new(fct);
        fps.size = Self::SIZE;
        Self {
            fps,
            xcount: 0,
            xpars: [0; FPS_MAX_XPARS],
        }
    }
}

// =============================================================================
// CONTINUAÇÃO DECODIFICADA
// =============================================================================

/// Significado de um valor de `status` após um passo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Success,
    Next,
    Delay,
    NoIrqs,
    DebugString,
    DebugHex,
    DebugDec,
    /// Código positivo não reconhecido
    Unknown(u32),
    /// Falha terminal do firmware
    Failed(i32),
}

impl Continuation {
    pub fn decode(status: u32) -> Self {
        match status {
            CGEB_SUCCESS => Self::Success,
            CGEB_NEXT => Self::Next,
            CGEB_DELAY => Self::Delay,
            CGEB_NOIRQS => Self::NoIrqs,
            CGEB_DBG_STR => Self::DebugString,
            CGEB_DBG_HEX => Self::DebugHex,
            CGEB_DBG_DEC => Self::DebugDec,
            s if (s as i32) < 0 => Self::Failed(s as i32),
            s => Self::Unknown(s),
        }
    }
}
