//! # Contexto de Firmware
//!
//! Tudo que uma board precisa para chamar o firmware: código relocado, área de
//! dados privada, tabela de memory-map e as janelas mapeadas para ela, o ponto
//! de entrada e o seletor de dados.
//!
//! Ciclo de vida:
//! 1. Criação por descoberta (`discover`) ou por registro direto (`with_entry`)
//! 2. Handshake: versão → data size → open → memory-map
//! 3. `Drop`: close (se aberto) → unmap de todas as janelas → libera regiões
//!
//! Qualquer falha no handshake derruba o contexto parcial pelo próprio `Drop`.

use super::descriptor;
use super::engine::CallEnv;
use super::entry::FirmwareEntry;
use super::functions::*;
use super::marshal::InvokeFlags;
use super::region::{OwnedRegion, DATA_ALIGN};
use super::reply::{FwRecord, MapTable, RecordKind};
use crate::core::config::{DriverConfig, Verbosity};
use crate::hal::{MappedRegion, Platform};
use crate::ioctl::error::{CgosError, CgosResult};
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Estado de uma sessão com o firmware.
pub struct FirmwareContext {
    platform: Arc<dyn Platform>,
    entry: Box<dyn FirmwareEntry>,
    /// Código relocado (ausente no registro direto)
    code: Option<OwnedRegion>,
    /// Área de dados privada do firmware
    data: Option<OwnedRegion>,
    map: Option<MapTable>,
    windows: Vec<MappedRegion>,
    data_segment: u16,
    verbosity: Verbosity,
    version: u32,
    opened: bool,
}

// SAFETY: os ponteiros crus (janelas, tabela, regiões) pertencem ao contexto;
// o acesso é serializado pelo mutex da board.
unsafe impl Send for FirmwareContext {}

impl FirmwareContext {
    /// Descobre o firmware na memória física e executa o handshake.
    pub fn discover(platform: Arc<dyn Platform>, config: &DriverConfig) -> CgosResult<Self> {
        let found = descriptor::discover(&*platform, config)?;

        platform.prepare_code(found.code.as_non_null(), found.code.len())?;
        let data_segment = platform.data_segment();
        let entry = platform.entry_at(found.code.addr() + found.entry_rel as usize, data_segment)?;

        let mut ctx = Self::bare(platform, entry, Some(found.code), config);
        ctx.establish(found.data_size)?;
        Ok(ctx)
    }

    /// Registra um ponto de entrada já conhecido e executa o handshake.
    ///
    /// `data_size == 0` pergunta o tamanho ao firmware.
    pub fn with_entry(
        platform: Arc<dyn Platform>,
        entry: Box<dyn FirmwareEntry>,
        data_size: u32,
        config: &DriverConfig,
    ) -> CgosResult<Self> {
        let mut ctx = Self::bare(platform, entry, None, config);
        ctx.establish(data_size)?;
        Ok(ctx)
    }

    fn bare(
        platform: Arc<dyn Platform>,
        entry: Box<dyn FirmwareEntry>,
        code: Option<OwnedRegion>,
        config: &DriverConfig,
    ) -> Self {
        let data_segment = platform.data_segment();
        Self {
            platform,
            entry,
            code,
            data: None,
            map: None,
            windows: Vec::new(),
            data_segment,
            verbosity: config.verbosity,
            version: 0,
            opened: false,
        }
    }

    // =========================================================================
    // HANDSHAKE
    // =========================================================================

    fn establish(&mut self, data_size: u32) -> CgosResult<()> {
        // 1. Versão: major incompatível nunca chega a usar a tabela de funções
        let version = self.invoke_plain(CGEB_GET_CGEB_VERSION, InvokeFlags::RETS0)?;
        if version_major(version) != CGEB_VERSION_MAJOR {
            crate::kerror!("(CGEB) Versão incompatível=", version);
            return Err(CgosError::Error);
        }
        self.version = version;

        // 2. Área de dados
        let size = if data_size != 0 {
            data_size
        } else {
            self.invoke_plain(CGEB_GET_DATA_SIZE, InvokeFlags::RETS0)?
        };
        self.data = Some(OwnedRegion::zeroed(size as usize, DATA_ALIGN)?);
        crate::kdebug!("(CGEB) Área de dados bytes=", dec size);

        // 3. Sessão
        self.invoke_plain(CGEB_OPEN, InvokeFlags::empty())?;
        self.opened = true;

        // 4. Memory-map
        self.map_memory()?;

        crate::kinfo!("(CGEB) Sessão aberta, versão=", version);
        Ok(())
    }

    /// Mapeia cada entrada não-nula da tabela e grava o virtual de volta.
    fn map_memory(&mut self) -> CgosResult<()> {
        let FwRecord::MapList(mut table) =
            self.invoke_record(CGEB_MAP_GET_MEM, 0, RecordKind::MapList)?
        else {
            return Err(CgosError::Error);
        };

        for index in 0..table.len() {
            let Some(entry) = table.entry(index) else {
                continue;
            };
            if entry.phys == 0 || entry.size == 0 {
                continue;
            }

            let phys = entry.phys as u64;
            let len = entry.size as usize;
            let virt = self.platform.map(phys, len)?;
            self.windows.push(MappedRegion { phys, virt, len });
            table.set_virt(index, virt.as_ptr() as usize, self.data_segment)?;

            if self.verbosity >= Verbosity::Calls {
                crate::kdebug!("(CGEB) Memory-map phys=", phys);
            }
        }

        self.map = Some(table);
        self.invoke_plain(CGEB_MAP_CHANGED, InvokeFlags::empty())?;
        Ok(())
    }

    // =========================================================================
    // ACESSO
    // =========================================================================

    /// Ambiente para o motor de chamadas.
    pub(super) fn env(&self) -> CallEnv<'_, dyn Platform> {
        CallEnv {
            entry: &*self.entry,
            delay: &*self.platform,
            data: self
                .data
                .as_ref()
                .map_or(core::ptr::null_mut(), OwnedRegion::as_ptr),
            data_segment: self.data_segment,
            verbosity: self.verbosity,
        }
    }

    /// Versão empacotada devolvida pelo firmware
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Janelas abertas para o memory-map do firmware
    pub fn mapped_windows(&self) -> &[MappedRegion] {
        &self.windows
    }

    pub fn map_table(&self) -> Option<&MapTable> {
        self.map.as_ref()
    }

    /// Tamanho do código relocado (0 no registro direto)
    pub fn code_len(&self) -> usize {
        self.code.as_ref().map_or(0, OwnedRegion::len)
    }

    pub fn data_len(&self) -> usize {
        self.data.as_ref().map_or(0, OwnedRegion::len)
    }
}

impl Drop for FirmwareContext {
    fn drop(&mut self) {
        if self.opened {
            self.opened = false;
            if let Err(e) = self.invoke_plain(CGEB_CLOSE, InvokeFlags::empty()) {
                crate::kwarn!("(CGEB) Close falhou status=", dec e.as_status());
            }
        }

        // A tabela referencia memória do firmware; solta antes das janelas
        self.map = None;
        for window in self.windows.drain(..) {
            self.platform.unmap(window.virt, window.len);
        }
        // `code` e `data` são liberados pelo Drop de OwnedRegion
    }
}
