//! Core Module
//!
//! Infraestrutura comum do driver, independente de arquitetura:
//! logging zero-overhead e configuração.

pub mod config;
pub mod logging;
