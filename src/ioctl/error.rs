//! Códigos de Status CGOS
//!
//! Sistema de erros unificado para o driver e para o envelope IOCTL.
//! Erros são devolvidos como valores negativos no campo `status` da resposta.

/// Erro do driver / firmware.
///
/// Os códigos conhecidos têm valor fixo; um status negativo desconhecido vindo
/// do firmware é preservado em `Firmware(code)` e repassado sem alteração.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgosError {
    /// Erro genérico (-1)
    Error,
    /// Tamanho, unidade ou formato inválido (-2)
    InvalidParameter,
    /// Opcode ou unidade não resolvidos (-3)
    NotFound,
    /// Falha de leitura (-4)
    ReadError,
    /// Falha de escrita (-5)
    WriteError,
    /// Timeout expirado (-6)
    Timeout,
    /// Operação não implementada (-7)
    NotImplemented,
    /// Status negativo do firmware fora da tabela acima
    Firmware(i32),
}

/// Status de sucesso no envelope
pub const CGOS_SUCCESS: i32 = 0;

impl CgosError {
    /// Converte para o status negativo do envelope
    #[inline]
    pub fn as_status(self) -> i32 {
        match self {
            Self::Error => -1,
            Self::InvalidParameter => -2,
            Self::NotFound => -3,
            Self::ReadError => -4,
            Self::WriteError => -5,
            Self::Timeout => -6,
            Self::NotImplemented => -7,
            Self::Firmware(code) => code,
        }
    }

    /// Cria erro a partir de código negativo
    pub fn from_status(code: i32) -> Option<Self> {
        if code >= 0 {
            return None;
        }
        match code {
            -1 => Some(Self::Error),
            -2 => Some(Self::InvalidParameter),
            -3 => Some(Self::NotFound),
            -4 => Some(Self::ReadError),
            -5 => Some(Self::WriteError),
            -6 => Some(Self::Timeout),
            -7 => Some(Self::NotImplemented),
            other => Some(Self::Firmware(other)),
        }
    }
}

/// Resultado de operação: Ok(valor) ou Err(CgosError)
pub type CgosResult<T> = Result<T, CgosError>;

/// Helper para converter CgosResult em status do envelope
pub fn result_to_status<T>(result: &CgosResult<T>) -> i32 {
    match result {
        Ok(_) => CGOS_SUCCESS,
        Err(e) => e.as_status(),
    }
}
