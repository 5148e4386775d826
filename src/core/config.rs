//! # Configuração do Driver
//!
//! Define constantes e a configuração de runtime do driver.
//!
//! A verbosidade de debug NÃO é um global: ela vive em `DriverConfig` e é
//! copiada para cada contexto de firmware no probe.

use crate::ioctl::error::{CgosError, CgosResult};

// =============================================================================
// JANELAS DE DESCOBERTA
// =============================================================================

/// Base da janela onde o descritor baixo ("$CGEBLD$") é procurado
pub const LOW_WINDOW_BASE: u64 = 0x000C_0000;

/// Tamanho da janela baixa (0xC0000 - 0xFFFFF)
pub const LOW_WINDOW_LEN: usize = 0x0004_0000;

/// Início padrão da janela alta quando o descritor baixo não traz dica
pub const HIGH_WINDOW_DEFAULT: u64 = 0xFFF0_0000;

/// Topo do espaço de endereçamento de 32 bits (fim exclusivo da janela alta)
pub const ADDRESS_SPACE_TOP: u64 = 0x1_0000_0000;

// =============================================================================
// LIMITES
// =============================================================================

/// Número máximo de boards gerenciadas
pub const MAX_BOARDS: usize = 4;

/// Número máximo de storage areas cacheadas por board
pub const MAX_STORAGE_AREAS: usize = 16;

/// Número máximo de watchdogs expostos por board
pub const MAX_WATCHDOGS: usize = 4;

/// Tamanho máximo de uma string de debug do firmware
pub const MAX_DEBUG_STRING: usize = 256;

// =============================================================================
// VERBOSIDADE
// =============================================================================

/// Nível de diagnóstico do protocolo de firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    /// Nada além de erros
    Quiet = 0,
    /// Uma linha por chamada ao firmware + mensagens DBG do firmware
    Calls = 1,
    /// Cada passo do loop de continuação
    Steps = 2,
}

impl Verbosity {
    pub fn from_level(level: u64) -> Self {
        match level {
            0 => Self::Quiet,
            1 => Self::Calls,
            _ => Self::Steps,
        }
    }
}

// =============================================================================
// CONFIGURAÇÃO DE RUNTIME
// =============================================================================

/// Configuração do driver, carregada explicitamente nos contextos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub verbosity: Verbosity,
    pub low_window_base: u64,
    pub low_window_len: usize,
    /// Início da janela alta quando o descritor baixo não informa
    pub high_window_default: u64,
    pub max_boards: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Quiet,
            low_window_base: LOW_WINDOW_BASE,
            low_window_len: LOW_WINDOW_LEN,
            high_window_default: HIGH_WINDOW_DEFAULT,
            max_boards: MAX_BOARDS,
        }
    }
}

impl DriverConfig {
    /// Lê parâmetros no formato da linha de comando do kernel.
    ///
    /// Chaves reconhecidas (as demais são ignoradas):
    /// - `cgeb.debug=<n>`
    /// - `cgeb.lowbase=<addr>` / `cgeb.lowlen=<len>`
    /// - `cgeb.hidesc=<addr>`
    /// - `cgeb.maxboards=<n>` (1..=MAX_BOARDS)
    ///
    /// Valores aceitam decimal ou hexadecimal com prefixo `0x`.
    pub fn from_cmdline(cmdline: &str) -> CgosResult<Self> {
        let mut cfg = Self::default();

        for token in cmdline.split_ascii_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            match key {
                "cgeb.debug" => cfg.verbosity = Verbosity::from_level(parse_number(value)?),
                "cgeb.lowbase" => cfg.low_window_base = parse_number(value)?,
                "cgeb.lowlen" => cfg.low_window_len = parse_number(value)? as usize,
                "cgeb.hidesc" => cfg.high_window_default = parse_number(value)?,
                "cgeb.maxboards" => {
                    let n = parse_number(value)? as usize;
                    if n == 0 || n > MAX_BOARDS {
                        crate::kwarn!("(Config) cgeb.maxboards fora do limite=", n);
                        return Err(CgosError::InvalidParameter);
                    }
                    cfg.max_boards = n;
                }
                _ => {}
            }
        }

        if cfg.low_window_len < 16 || cfg.high_window_default >= ADDRESS_SPACE_TOP {
            return Err(CgosError::InvalidParameter);
        }
        Ok(cfg)
    }
}

/// Converte "123" ou "0x7B".
fn parse_number(value: &str) -> CgosResult<u64> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| CgosError::InvalidParameter)
}

// =============================================================================
// TESTS
// =============================================================================
