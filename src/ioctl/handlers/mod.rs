//! Handlers locais da tabela de dispatch, por domínio.
//!
//! Cada handler recebe a `Call` já validada e resolvida e preenche `rets` e a
//! cauda de saída.

pub mod board;
pub mod driver;
pub mod i2c;
pub mod io;
pub mod storage;
pub mod wdog;
