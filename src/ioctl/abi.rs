//! ABI do envelope CGOS.
//!
//! # Layout (u32 little-endian)
//!
//! | Requisição          | Resposta            |
//! |---------------------|---------------------|
//! | opcode              | status (i32)        |
//! | handle (1-based)    | rets[0]             |
//! | unit (classe│índice)| rets[1]             |
//! | pars[0..4]          | cauda de saída ...  |
//! | cauda de entrada ...|                     |

use super::error::{CgosError, CgosResult};
use crate::cgeb::reply::le_u32;
use alloc::vec::Vec;

/// Código de controle aceito pelo dispatcher
pub const CGOS_IOCTL: u32 = 0xC00C_6701;

/// Tamanho do cabeçalho de requisição
pub const REQUEST_HEADER_LEN: usize = 28;

/// Tamanho do cabeçalho de resposta
pub const RESPONSE_HEADER_LEN: usize = 12;

/// Cabeçalho de requisição decodificado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Request {
    pub opcode: u32,
    pub handle: u32,
    pub unit: u32,
    pub pars: [u32; 4],
}

impl Request {
    /// Decodifica o cabeçalho; devolve a cauda de entrada.
    pub fn decode(input: &[u8]) -> CgosResult<(Self, &[u8])> {
        if input.len() < REQUEST_HEADER_LEN {
            return Err(CgosError::InvalidParameter);
        }
        let word = |i: usize| le_u32(input, i * 4).unwrap_or(0);
        let req = Self {
            opcode: word(0),
            handle: word(1),
            unit: word(2),
            pars: [word(3), word(4), word(5), word(6)],
        };
        Ok((req, &input[REQUEST_HEADER_LEN..]))
    }

    /// Serializa cabeçalho + cauda (lado do transporte).
    pub fn encode(&self, tail: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(REQUEST_HEADER_LEN + tail.len());
        for w in [self.opcode, self.handle, self.unit] {
            out.extend_from_slice(&w.to_le_bytes());
        }
        for p in self.pars {
            out.extend_from_slice(&p.to_le_bytes());
        }
        out.extend_from_slice(tail);
        out
    }
}

/// Cabeçalho de resposta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    pub status: i32,
    pub rets: [u32; 2],
}

impl Response {
    pub fn to_bytes(&self) -> [u8; RESPONSE_HEADER_LEN] {
        let mut header = [0u8; RESPONSE_HEADER_LEN];
        header[0..4].copy_from_slice(&self.status.to_le_bytes());
        header[4..8].copy_from_slice(&self.rets[0].to_le_bytes());
        header[8..12].copy_from_slice(&self.rets[1].to_le_bytes());
        header
    }

    /// Escreve o cabeçalho no início de `output`.
    pub fn write_to(&self, output: &mut [u8]) -> CgosResult<()> {
        let header = output
            .get_mut(..RESPONSE_HEADER_LEN)
            .ok_or(CgosError::InvalidParameter)?;
        header.copy_from_slice(&self.to_bytes());
        Ok(())
    }

    pub fn decode(output: &[u8]) -> CgosResult<(Self, &[u8])> {
        if output.len() < RESPONSE_HEADER_LEN {
            return Err(CgosError::InvalidParameter);
        }
        let word = |i: usize| le_u32(output, i * 4).unwrap_or(0);
        let resp = Self {
            status: word(0) as i32,
            rets: [word(1), word(2)],
        };
        Ok((resp, &output[RESPONSE_HEADER_LEN..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        let req = Request { opcode: 29, handle: 1, unit: 0x0001_0002, pars: [8, 4, 0, 0] };
        let bytes = req.encode(&[0xAA, 0xBB]);
        assert_eq!(bytes.len(), REQUEST_HEADER_LEN + 2);
        assert_eq!(&bytes[8..12], &0x0001_0002u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &4u32.to_le_bytes());

        let (decoded, tail) = Request::decode(&bytes).unwrap();
        assert_eq!(decoded, req);
        assert_eq!(tail, &[0xAA, 0xBB]);
    }

    #[test]
    fn test_short_buffers_are_rejected() {
        assert_eq!(Request::decode(&[0u8; 27]).err(), Some(CgosError::InvalidParameter));
        let mut out = [0u8; 11];
        let resp = Response { status: -2, rets: [0, 0] };
        assert_eq!(resp.write_to(&mut out).err(), Some(CgosError::InvalidParameter));
    }

    #[test]
    fn test_negative_status_encoding() {
        let mut out = [0u8; 16];
        Response { status: -1234, rets: [7, 9] }.write_to(&mut out).unwrap();
        let (resp, tail) = Response::decode(&out).unwrap();
        assert_eq!(resp.status, -1234);
        assert_eq!(resp.rets, [7, 9]);
        assert_eq!(tail.len(), 4);
    }
}
