//! Interface de Temporização
//!
//! O protocolo CGEB pede esperas ativas curtas, sleeps em milissegundos e
//! cessões do quantum de CPU entre passos de uma mesma chamada.

/// Serviços de espera fornecidos pelo ambiente.
pub trait Delay {
    /// Espera ativa (spin) por `us` microssegundos. Usado para `us < 1000`.
    fn udelay(&self, us: u32);

    /// Dorme por `ms` milissegundos.
    fn msleep(&self, ms: u32);

    /// Cede o restante do quantum ao scheduler.
    fn yield_now(&self);
}
