//! # Boards
//!
//! Uma board é uma plataforma gerenciada com um firmware CGEB próprio. No
//! probe o handshake roda uma vez e o que é estático fica cacheado:
//!
//! - registro de identificação (nome, fabricante, classe)
//! - versão do BIOS de sistema
//! - storage areas (até `MAX_STORAGE_AREAS`)
//! - quantidade de barramentos I2C e de watchdogs
//!
//! O contexto de firmware fica atrás de um `spin::Mutex`: uma board nunca tem
//! duas chamadas em andamento.

pub mod registry;
pub mod resolve;
pub mod storage;

pub use registry::BoardRegistry;
pub use storage::StorageArea;

use crate::cgeb::functions::*;
use crate::cgeb::reply::BoardRecord;
use crate::cgeb::{FirmwareContext, FirmwareEntry, FwRecord, InvokeFlags, RecordKind};
use crate::core::config::{DriverConfig, MAX_WATCHDOGS};
use crate::hal::Platform;
use crate::ioctl::error::{CgosError, CgosResult};
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::{Mutex, MutexGuard};

/// Uma board com sessão de firmware aberta.
pub struct Board {
    fw: Mutex<FirmwareContext>,
    info: BoardRecord,
    bios_version: u32,
    cgeb_version: u32,
    storage: Vec<StorageArea>,
    i2c_count: u32,
    wdog_count: u32,
}

impl Board {
    /// Descobre o firmware na memória física e enumera a board.
    pub fn probe(platform: Arc<dyn Platform>, config: &DriverConfig) -> CgosResult<Self> {
        let ctx = FirmwareContext::discover(platform, config)?;
        Self::enumerate(ctx)
    }

    /// Registra um ponto de entrada conhecido (sem descoberta).
    pub fn with_entry(
        platform: Arc<dyn Platform>,
        entry: Box<dyn FirmwareEntry>,
        data_size: u32,
        config: &DriverConfig,
    ) -> CgosResult<Self> {
        let ctx = FirmwareContext::with_entry(platform, entry, data_size, config)?;
        Self::enumerate(ctx)
    }

    /// Parte do handshake comum às duas formas de criação.
    ///
    /// Em erro, `ctx` é derrubado aqui mesmo (close + unmap).
    fn enumerate(mut ctx: FirmwareContext) -> CgosResult<Self> {
        let FwRecord::BoardInfo(info) = ctx.invoke_record(CGEB_BOARD_GET_INFO, 0, RecordKind::BoardInfo)?
        else {
            return Err(CgosError::Error);
        };
        let bios_version = ctx.invoke_plain(CGEB_GET_SYS_BIOS_VERSION, InvokeFlags::RETS0)?;
        let storage = storage::enumerate(&mut ctx)?;
        let i2c_count = ctx.invoke_plain(CGEB_I2C_COUNT, InvokeFlags::RETS0)?;

        let mut wdog_count = ctx.invoke_plain(CGEB_WDOG_COUNT, InvokeFlags::RETS0)?;
        if wdog_count as usize > MAX_WATCHDOGS {
            crate::kwarn!("(Board) Watchdogs além do limite=", dec wdog_count);
            wdog_count = MAX_WATCHDOGS as u32;
        }

        crate::kinfo!("(Board) Registrada: ", str info.name());
        crate::kdebug!("(Board) Storage areas=", dec storage.len());

        Ok(Self {
            cgeb_version: ctx.version(),
            fw: Mutex::new(ctx),
            info,
            bios_version,
            storage,
            i2c_count,
            wdog_count,
        })
    }

    // =========================================================================
    // CACHE
    // =========================================================================

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn info(&self) -> &BoardRecord {
        &self.info
    }

    pub fn primary_class(&self) -> u32 {
        self.info.primary_class()
    }

    pub fn bios_version(&self) -> u32 {
        self.bios_version
    }

    /// Versão do protocolo CGEB negociada no handshake
    pub fn cgeb_version(&self) -> u32 {
        self.cgeb_version
    }

    pub fn storage_areas(&self) -> &[StorageArea] {
        &self.storage
    }

    pub fn i2c_count(&self) -> u32 {
        self.i2c_count
    }

    pub fn wdog_count(&self) -> u32 {
        self.wdog_count
    }

    /// Acesso exclusivo ao firmware.
    pub fn firmware(&self) -> MutexGuard<'_, FirmwareContext> {
        self.fw.lock()
    }
}
