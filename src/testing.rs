//! Dublês de teste: firmware roteirizado, plataforma com memória física
//! simulada e um modelo de board completo.

use crate::cgeb::entry::FirmwareEntry;
use crate::cgeb::fps::*;
use crate::cgeb::functions::*;
use crate::cgeb::reply::{MapMem, BOARD_INFO_SIZE, MAP_ENTRIES_OFFSET};
use crate::cgeb::FirmwareContext;
use crate::core::config::DriverConfig;
use crate::core::logging::{set_sink, LogSink};
use crate::hal::{Delay, PhysMemory, Platform};
use crate::ioctl::error::{CgosError, CgosResult};
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;
use std::boxed::Box;
use std::collections::BTreeMap;
use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

// =============================================================================
// LOG
// =============================================================================

/// Sink que acumula tudo o que foi emitido.
pub struct LogCapture(Mutex<String>);

impl LogCapture {
    pub const fn new() -> Self {
        Self(Mutex::new(String::new()))
    }

    pub fn text(&self) -> String {
        self.0.lock().clone()
    }
}

impl LogSink for LogCapture {
    fn write_str(&self, s: &str) {
        self.0.lock().push_str(s);
    }
}

/// O sink global só aceita um registro; todos os testes compartilham este.
pub static LOG: LogCapture = LogCapture::new();

/// Garante que o log dos testes vai para `LOG`.
pub fn capture_log() {
    set_sink(&LOG);
}

// =============================================================================
// TEMPORIZAÇÃO
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    Udelay(u32),
    Msleep(u32),
    Yield,
}

/// `Delay` que só registra os pedidos.
#[derive(Default)]
pub struct TimingLog(Mutex<Vec<Timing>>);

impl TimingLog {
    pub fn events(&self) -> Vec<Timing> {
        self.0.lock().clone()
    }
}

impl Delay for TimingLog {
    fn udelay(&self, us: u32) {
        self.0.lock().push(Timing::Udelay(us));
    }

    fn msleep(&self, ms: u32) {
        self.0.lock().push(Timing::Msleep(ms));
    }

    fn yield_now(&self) {
        self.0.lock().push(Timing::Yield);
    }
}

// =============================================================================
// FIRMWARE ROTEIRIZADO
// =============================================================================

type Script = Box<dyn Fn(&mut Fps, Option<&mut [u32]>) + Send + Sync>;

/// Firmware cujo comportamento é uma closure chamada a cada passo.
pub struct StubFirmware {
    address: usize,
    script: Script,
    invocations: AtomicUsize,
    functions: Mutex<Vec<u32>>,
}

impl StubFirmware {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&mut Fps, Option<&mut [u32]>) + Send + Sync + 'static,
    {
        Self::at(0x1000, script)
    }

    pub fn at<F>(address: usize, script: F) -> Self
    where
        F: Fn(&mut Fps, Option<&mut [u32]>) + Send + Sync + 'static,
    {
        Self {
            address,
            script: Box::new(script),
            invocations: AtomicUsize::new(0),
            functions: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Função de cada passo executado, em ordem
    pub fn functions(&self) -> Vec<u32> {
        self.functions.lock().clone()
    }

    /// Quantas chamadas (primeiro passo) da função `fct`
    pub fn calls_of(&self, fct: u32) -> usize {
        self.functions.lock().iter().filter(|&&f| f == fct).count()
    }
}

impl FirmwareEntry for StubFirmware {
    fn address(&self) -> usize {
        self.address
    }

    unsafe fn invoke(&self, fps: *mut Fps) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.functions.lock().push((*fps).fct);

        if (*fps).size >= FpsExt::SIZE {
            let ext = &mut *fps.cast::<FpsExt>();
            let count = (ext.xcount as usize).min(FPS_MAX_XPARS);
            (self.script)(&mut ext.fps, Some(&mut ext.xpars[..count]));
        } else {
            (self.script)(&mut *fps, None);
        }
    }
}

/// O mesmo firmware visto num endereço de relocação.
struct Relocated {
    address: usize,
    fw: Arc<StubFirmware>,
}

impl FirmwareEntry for Relocated {
    fn address(&self) -> usize {
        self.address
    }

    unsafe fn invoke(&self, fps: *mut Fps) {
        self.fw.invoke(fps)
    }
}

impl FirmwareEntry for Arc<StubFirmware> {
    fn address(&self) -> usize {
        self.as_ref().address()
    }

    unsafe fn invoke(&self, fps: *mut Fps) {
        self.as_ref().invoke(fps)
    }
}

/// Responde o handshake e delega as demais funções a `script`.
pub fn with_session<F>(script: F) -> impl Fn(&mut Fps, Option<&mut [u32]>) + Send + Sync + 'static
where
    F: Fn(&mut Fps, Option<&mut [u32]>) + Send + Sync + 'static,
{
    move |fps, xpars| match fps.fct {
        CGEB_GET_CGEB_VERSION => {
            fps.rets[0] = 0x0100_0005;
            fps.status = CGEB_SUCCESS;
        }
        CGEB_GET_DATA_SIZE => {
            fps.rets[0] = 64;
            fps.status = CGEB_SUCCESS;
        }
        CGEB_OPEN | CGEB_CLOSE | CGEB_MAP_CHANGED => fps.status = CGEB_SUCCESS,
        CGEB_MAP_GET_MEM => {
            fps.optr = ptr::null_mut();
            fps.status = CGEB_SUCCESS;
        }
        _ => script(fps, xpars),
    }
}

/// Contexto com sessão aberta sobre um firmware roteirizado.
pub fn session_context<F>(script: F) -> (FirmwareContext, Arc<StubFirmware>)
where
    F: Fn(&mut Fps, Option<&mut [u32]>) + Send + Sync + 'static,
{
    let fw = Arc::new(StubFirmware::new(with_session(script)));
    let platform: Arc<dyn Platform> = Arc::new(FakePlatform::new());
    let ctx = FirmwareContext::with_entry(
        platform,
        Box::new(fw.clone()),
        0,
        &DriverConfig::default(),
    )
    .expect("handshake do stub");
    (ctx, fw)
}

/// Copia `bytes` para um buffer que vive até o fim do processo.
pub fn leak_bytes(bytes: &[u8]) -> usize {
    Box::leak(bytes.to_vec().into_boxed_slice()).as_ptr() as usize
}

// =============================================================================
// PLATAFORMA FALSA
// =============================================================================

/// Memória física simulada + registro de mapeamentos e esperas.
pub struct FakePlatform {
    memory: Mutex<BTreeMap<u64, Box<[u8]>>>,
    scratch: Mutex<Vec<Box<[u8]>>>,
    outstanding: Mutex<Vec<(u64, usize, usize)>>,
    timings: TimingLog,
    firmware: Option<Arc<StubFirmware>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            memory: Mutex::new(BTreeMap::new()),
            scratch: Mutex::new(Vec::new()),
            outstanding: Mutex::new(Vec::new()),
            timings: TimingLog::default(),
            firmware: None,
        }
    }

    /// Plataforma cujo `entry_at` devolve `fw` no endereço relocado.
    pub fn with_firmware(fw: Arc<StubFirmware>) -> Self {
        Self {
            firmware: Some(fw),
            ..Self::new()
        }
    }

    /// Instala `bytes` no endereço físico `base`.
    pub fn add_memory(&self, base: u64, bytes: Vec<u8>) {
        self.memory.lock().insert(base, bytes.into_boxed_slice());
    }

    /// Mapeamentos ainda não desfeitos
    pub fn outstanding_maps(&self) -> usize {
        self.outstanding.lock().len()
    }

    /// Endereços físicos mapeados no momento
    pub fn mapped_phys(&self) -> Vec<u64> {
        self.outstanding.lock().iter().map(|&(p, _, _)| p).collect()
    }

    pub fn timings(&self) -> Vec<Timing> {
        self.timings.events()
    }
}

impl PhysMemory for FakePlatform {
    fn map(&self, phys: u64, len: usize) -> CgosResult<NonNull<u8>> {
        let mut memory = self.memory.lock();
        let hit = memory
            .range_mut(..=phys)
            .next_back()
            .filter(|(base, bytes)| phys + len as u64 <= **base + bytes.len() as u64)
            .map(|(base, bytes)| {
                // SAFETY (teste): offset dentro do buffer.
                unsafe { bytes.as_mut_ptr().add((phys - base) as usize) }
            });

        let virt = match hit {
            Some(p) => p,
            None => {
                // Fora da memória simulada: buffer zerado próprio
                let mut buf = vec![0u8; len.max(1)].into_boxed_slice();
                let p = buf.as_mut_ptr();
                self.scratch.lock().push(buf);
                p
            }
        };

        self.outstanding.lock().push((phys, virt as usize, len));
        NonNull::new(virt).ok_or(CgosError::Error)
    }

    fn unmap(&self, virt: NonNull<u8>, len: usize) {
        let mut outstanding = self.outstanding.lock();
        let pos = outstanding
            .iter()
            .position(|&(_, v, l)| v == virt.as_ptr() as usize && l == len)
            .expect("unmap sem map correspondente");
        outstanding.remove(pos);
    }
}

impl Delay for FakePlatform {
    fn udelay(&self, us: u32) {
        self.timings.udelay(us);
    }

    fn msleep(&self, ms: u32) {
        self.timings.msleep(ms);
    }

    fn yield_now(&self) {
        self.timings.yield_now();
    }
}

impl Platform for FakePlatform {
    fn entry_at(&self, address: usize, _data_segment: u16) -> CgosResult<Box<dyn FirmwareEntry>> {
        match &self.firmware {
            Some(fw) => Ok(Box::new(Relocated {
                address,
                fw: fw.clone(),
            })),
            None => Err(CgosError::NotImplemented),
        }
    }
}

// =============================================================================
// DESCRITORES
// =============================================================================

/// Descritor baixo com `size` declarado e dica para o alto.
pub fn low_descriptor(size: u16, hint: u32) -> [u8; 24] {
    let mut d = [0u8; 24];
    d[..8].copy_from_slice(crate::cgeb::descriptor::LOW_MAGIC);
    d[8..10].copy_from_slice(&size.to_le_bytes());
    d[12..20].copy_from_slice(b"BIOSTEST");
    d[20..24].copy_from_slice(&hint.to_le_bytes());
    d
}

/// Blob de código começando pelo descritor alto.
pub fn high_descriptor(data_size: u32, code_size: u32, entry_rel: u32) -> Vec<u8> {
    let mut d = vec![0xCCu8; (code_size as usize).max(24)];
    d[..8].copy_from_slice(crate::cgeb::descriptor::HIGH_MAGIC);
    d[8..10].copy_from_slice(&24u16.to_le_bytes());
    d[10..12].fill(0);
    d[12..16].copy_from_slice(&data_size.to_le_bytes());
    d[16..20].copy_from_slice(&code_size.to_le_bytes());
    d[20..24].copy_from_slice(&entry_rel.to_le_bytes());
    d
}

// =============================================================================
// MODELO DE BOARD
// =============================================================================

pub const MODEL_CGEB_VERSION: u32 = 0x0100_0203;
pub const MODEL_BIOS_VERSION: u32 = 0x0107_0002;
pub const MODEL_VGA_BIOS_VERSION: u32 = 0x0002_0001;
pub const MODEL_BOOT_COUNTER: u32 = 1234;
pub const MODEL_BOOT_LOG_LEN: usize = 40;
pub const MODEL_I2C_FREQ: u32 = 100_000;
pub const MODEL_I2C_MAX_FREQ: u32 = 400_000;

/// Storage area simulada.
pub struct ModelArea {
    pub kind: u32,
    pub block_size: u32,
    pub bytes: Vec<u8>,
    pub locked: bool,
}

/// Firmware de board completo (versão, sessão, memory-map, classes).
pub struct BoardModel {
    pub version: u32,
    pub name: &'static str,
    pub primary_class: u32,
    pub areas: Mutex<Vec<ModelArea>>,
    pub i2c: Vec<u32>,
    pub wdogs: u32,
    pub io: Mutex<[u32; 2]>,
    pub wdog_config: Mutex<Vec<u32>>,
    pub closes: AtomicUsize,
    /// Virtuais lidos da tabela no MapChanged
    pub seen_virt: Mutex<Vec<usize>>,
    map_list: Mutex<Box<[u64]>>,
    board_info: Box<[u8]>,
    scratch: Mutex<Box<[u8]>>,
}

fn info_record(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

impl BoardModel {
    /// Board com 4 storage areas (uma reservada), 4 barramentos I2C, 1
    /// watchdog e um memory-map com uma entrada nula e uma real.
    pub fn standard(name: &'static str) -> Self {
        let areas = vec![
            ModelArea { kind: 0x0001_0000, block_size: 1, bytes: vec![0; 64], locked: false },
            ModelArea { kind: 0x0002_0000, block_size: 64, bytes: vec![0xFF; 256], locked: false },
            ModelArea { kind: 0x8001_0000, block_size: 1, bytes: vec![0; 32], locked: false },
            ModelArea { kind: 0x0001_0000, block_size: 1, bytes: vec![0; 32], locked: false },
        ];

        let mut board_info = vec![0u8; BOARD_INFO_SIZE];
        board_info[..4].copy_from_slice(&(BOARD_INFO_SIZE as u32).to_le_bytes());
        board_info[20..20 + name.len()].copy_from_slice(name.as_bytes());
        board_info[52..56].copy_from_slice(b"cgtx");

        let mut model = Self {
            version: MODEL_CGEB_VERSION,
            name,
            primary_class: 0x0001_0000,
            areas: Mutex::new(areas),
            i2c: vec![0x0001_0000, 0x0002_0000, 0x0003_0000, 0x0001_0000],
            wdogs: 1,
            io: Mutex::new([0; 2]),
            wdog_config: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
            seen_virt: Mutex::new(Vec::new()),
            map_list: Mutex::new(Vec::new().into_boxed_slice()),
            board_info: board_info.into_boxed_slice(),
            scratch: Mutex::new(vec![0u8; 4096].into_boxed_slice()),
        };
        model.set_map(&[(0, 0), (0xFED4_0000, 0x1000)]);
        model
    }

    /// Registro de identificação com `size` bytes declarados e devolvidos.
    pub fn with_info_size(mut self, size: usize) -> Self {
        let mut info = self.board_info.to_vec();
        info.resize(size, 0);
        info[..4].copy_from_slice(&(size as u32).to_le_bytes());
        self.board_info = info.into_boxed_slice();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Reescreve a tabela de memory-map.
    pub fn set_map(&mut self, entries: &[(usize, u32)]) {
        let bytes = MAP_ENTRIES_OFFSET + entries.len() * core::mem::size_of::<MapMem>();
        let mut words = vec![0u64; bytes / 8 + 1].into_boxed_slice();
        let base = words.as_mut_ptr().cast::<u8>();
        // SAFETY (teste): buffer dimensionado para a tabela.
        unsafe {
            ptr::write_unaligned(base.cast::<u32>(), entries.len() as u32);
            for (i, &(phys, size)) in entries.iter().enumerate() {
                let at = base.add(MAP_ENTRIES_OFFSET + i * core::mem::size_of::<MapMem>());
                ptr::write_unaligned(
                    at.cast::<MapMem>(),
                    MapMem { phys, size, virt: FarPtr::default() },
                );
            }
        }
        *self.map_list.lock() = words;
    }

    /// Converte o modelo em firmware roteirizado.
    pub fn into_firmware(self) -> (Arc<BoardModel>, Arc<StubFirmware>) {
        let model = Arc::new(self);
        let m = model.clone();
        let fw = Arc::new(StubFirmware::new(move |fps, xpars| m.step(fps, xpars)));
        (model, fw)
    }

    /// Grava `bytes` no scratch do firmware e aponta `optr` para ele.
    fn reply_with(&self, fps: &mut Fps, bytes: &[u8]) {
        let mut scratch = self.scratch.lock();
        scratch[..bytes.len()].copy_from_slice(bytes);
        fps.optr = scratch.as_mut_ptr();
    }

    fn fail(fps: &mut Fps, err: CgosError) {
        fps.status = err.as_status() as u32;
    }

    fn step(&self, fps: &mut Fps, xpars: Option<&mut [u32]>) {
        fps.status = CGEB_SUCCESS;
        let unit = fps.unit as usize;

        match fps.fct {
            CGEB_GET_CGEB_VERSION => fps.rets[0] = self.version,
            CGEB_GET_SYS_BIOS_VERSION => fps.rets[0] = MODEL_BIOS_VERSION,
            CGEB_GET_VGA_BIOS_VERSION => fps.rets[0] = MODEL_VGA_BIOS_VERSION,
            CGEB_GET_DATA_SIZE => fps.rets[0] = 256,
            CGEB_OPEN => {
                if fps.data.off == 0 {
                    Self::fail(fps, CgosError::Error);
                }
            }
            CGEB_CLOSE => {
                self.closes.fetch_add(1, Ordering::SeqCst);
            }
            CGEB_MAP_GET_MEM => fps.optr = self.map_list.lock().as_mut_ptr().cast::<u8>(),
            CGEB_MAP_CHANGED => {
                let list = self.map_list.lock();
                let base = list.as_ptr().cast::<u8>();
                // SAFETY (teste): tabela construída por set_map.
                unsafe {
                    let count = ptr::read_unaligned(base.cast::<u32>()) as usize;
                    for i in 0..count {
                        let at = base.add(MAP_ENTRIES_OFFSET + i * core::mem::size_of::<MapMem>());
                        let entry = ptr::read_unaligned(at.cast::<MapMem>());
                        self.seen_virt.lock().push(entry.virt.off);
                    }
                }
            }

            // --- Board ---
            CGEB_BOARD_GET_INFO => {
                let mut rec = self.board_info.to_vec();
                rec[128..132].copy_from_slice(&self.primary_class.to_le_bytes());
                self.reply_with(fps, &rec);
            }
            CGEB_BOARD_GET_BOOT_COUNTER => {
                // Um NEXT antes do resultado
                if fps.cont == 0 {
                    fps.cont = 1;
                    fps.status = CGEB_NEXT;
                } else {
                    fps.rets[0] = MODEL_BOOT_COUNTER;
                }
            }
            CGEB_BOARD_GET_RUNNING_TIME_METER => {
                if fps.cont == 0 {
                    fps.cont = 1;
                    fps.rets[0] = 50;
                    fps.status = CGEB_DELAY;
                } else {
                    fps.rets[0] = 99;
                }
            }
            CGEB_BOARD_GET_BOOT_ERROR_LOG => {
                let log: Vec<u8> = (0..MODEL_BOOT_LOG_LEN as u8).collect();
                self.reply_with(fps, &log);
                fps.rets[0] = MODEL_BOOT_LOG_LEN as u32;
            }

            // --- VGA ---
            CGEB_VGA_COUNT => fps.rets[0] = 1,
            CGEB_VGA_GET_INFO => self.reply_with(fps, &info_record(&[32, 1, 800, 600, 24, 0, 0, 0])),
            CGEB_VGA_GET_CONTRAST..=CGEB_VGA_END_DARK_BOOT => {
                if unit != 0 {
                    Self::fail(fps, CgosError::InvalidParameter);
                } else {
                    fps.rets[0] = 50;
                }
            }

            // --- Storage ---
            CGEB_STORAGE_AREA_COUNT => fps.rets[0] = self.areas.lock().len() as u32,
            CGEB_STORAGE_AREA_GET_INFO => {
                let rec = {
                    let areas = self.areas.lock();
                    areas.get(unit).map(|a| {
                        info_record(&[20, a.kind, 0, a.bytes.len() as u32, a.block_size])
                    })
                };
                match rec {
                    Some(rec) => self.reply_with(fps, &rec),
                    None => Self::fail(fps, CgosError::InvalidParameter),
                }
            }
            CGEB_STORAGE_AREA_READ => {
                let (off, len) = (fps.pars[0] as usize, fps.pars[1] as usize);
                let data = {
                    let areas = self.areas.lock();
                    areas
                        .get(unit)
                        .and_then(|a| a.bytes.get(off..off + len))
                        .map(|s| s.to_vec())
                };
                match data {
                    Some(d) => self.reply_with(fps, &d),
                    None => Self::fail(fps, CgosError::ReadError),
                }
            }
            CGEB_STORAGE_AREA_WRITE => {
                let (off, len) = (fps.pars[0] as usize, fps.pars[1] as usize);
                let mut areas = self.areas.lock();
                match areas.get_mut(unit) {
                    Some(a) if a.locked => Self::fail(fps, CgosError::WriteError),
                    Some(a) if off + len <= a.bytes.len() && !fps.iptr.is_null() => {
                        // SAFETY (teste): o driver passou `len` bytes em iptr.
                        let src = unsafe { core::slice::from_raw_parts(fps.iptr, len) };
                        a.bytes[off..off + len].copy_from_slice(src);
                    }
                    _ => Self::fail(fps, CgosError::WriteError),
                }
            }
            CGEB_STORAGE_AREA_ERASE => {
                let (off, len) = (fps.pars[0] as usize, fps.pars[1] as usize);
                let mut areas = self.areas.lock();
                match areas.get_mut(unit).and_then(|a| a.bytes.get_mut(off..off + len)) {
                    Some(range) => range.fill(0xFF),
                    None => Self::fail(fps, CgosError::WriteError),
                }
            }
            CGEB_STORAGE_AREA_ERASE_STATUS => fps.rets[0] = 0,
            CGEB_STORAGE_AREA_LOCK | CGEB_STORAGE_AREA_UNLOCK => {
                let lock = fps.fct == CGEB_STORAGE_AREA_LOCK;
                match self.areas.lock().get_mut(unit) {
                    Some(a) => a.locked = lock,
                    None => Self::fail(fps, CgosError::InvalidParameter),
                }
            }
            CGEB_STORAGE_AREA_IS_LOCKED => {
                fps.rets[0] = self.areas.lock().get(unit).map_or(0, |a| a.locked as u32);
            }

            // --- I2C ---
            CGEB_I2C_COUNT => fps.rets[0] = self.i2c.len() as u32,
            CGEB_I2C_GET_INFO => match self.i2c.get(unit) {
                Some(&kind) => {
                    self.reply_with(fps, &info_record(&[16, kind, MODEL_I2C_FREQ, MODEL_I2C_MAX_FREQ]))
                }
                None => Self::fail(fps, CgosError::InvalidParameter),
            },
            CGEB_I2C_GET_ADDR_LIST => {
                self.reply_with(fps, &[0x50, 0x51, 0x68]);
                fps.rets[0] = 3;
            }
            CGEB_I2C_TRANSFER => {
                // Leitura: preenche `pars[1]` bytes direto no buffer do chamador
                if !fps.optr.is_null() {
                    for i in 0..fps.pars[1] as usize {
                        // SAFETY (teste): o driver validou a capacidade.
                        unsafe { *fps.optr.add(i) = fps.pars[0] as u8 + i as u8 };
                    }
                }
            }
            CGEB_I2C_GET_FREQUENCY => fps.rets[0] = MODEL_I2C_FREQ,
            CGEB_I2C_SET_FREQUENCY => {}

            // --- GPIO ---
            CGEB_IO_COUNT => fps.rets[0] = 2,
            CGEB_IO_GET_INFO => fps.rets = [0xFF, 0x0F],
            CGEB_IO_READ => match self.io.lock().get(unit) {
                Some(&v) => fps.rets[0] = v,
                None => Self::fail(fps, CgosError::InvalidParameter),
            },
            CGEB_IO_WRITE => match self.io.lock().get_mut(unit) {
                Some(v) => *v = fps.pars[0],
                None => Self::fail(fps, CgosError::InvalidParameter),
            },
            CGEB_IO_GET_DIRECTION => fps.rets[0] = 0x0F,
            CGEB_IO_SET_DIRECTION => {}

            // --- Watchdog ---
            CGEB_WDOG_COUNT => fps.rets[0] = self.wdogs,
            CGEB_WDOG_GET_INFO => self.reply_with(fps, &info_record(&[24, 1000, 60_000, 3, 0, 0])),
            CGEB_WDOG_TRIGGER => {}
            CGEB_WDOG_GET_CONFIG => {
                if let Some(xpars) = xpars {
                    for (i, x) in xpars.iter_mut().enumerate() {
                        *x = 100 * (i as u32 + 1);
                    }
                }
            }
            CGEB_WDOG_SET_CONFIG => {
                let config = match xpars {
                    Some(x) => x.to_vec(),
                    None => fps.pars.to_vec(),
                };
                *self.wdog_config.lock() = config;
            }

            // --- Sensores / performance / CGBC ---
            CGEB_CGBC_GET_INFO => self.reply_with(fps, &info_record(&[12, 0x0003_0001, 7])),
            CGEB_CGBC_READ_WRITE | CGEB_CGBC_HANDLE_COMMAND => {
                // Eco dos bytes de entrada no scratch
                let len = fps.pars[1] as usize;
                if !fps.iptr.is_null() && len > 0 {
                    // SAFETY (teste): o driver passou a cauda de entrada.
                    let src = unsafe { core::slice::from_raw_parts(fps.iptr, len) }.to_vec();
                    self.reply_with(fps, &src);
                }
            }
            CGEB_CGBC_SET_CONTROL => fps.rets[0] = fps.pars[0],
            CGEB_PERFORMANCE_GET_CURRENT..=CGEB_VOLTAGE_SET_LIMITS => {
                fps.rets = [fps.fct * 1000, 0];
            }

            _ => Self::fail(fps, CgosError::NotImplemented),
        }
    }
}

/// Plataforma com descritores em memória e o modelo como firmware.
pub fn discoverable_platform(model: BoardModel) -> (Arc<FakePlatform>, Arc<BoardModel>, Arc<StubFirmware>) {
    use crate::core::config::{ADDRESS_SPACE_TOP, LOW_WINDOW_BASE, LOW_WINDOW_LEN};

    const HIGH: u64 = 0xFFFF_0000;
    let (model, fw) = model.into_firmware();
    let platform = FakePlatform::with_firmware(fw.clone());

    let mut low = vec![0u8; LOW_WINDOW_LEN];
    low[0x100..0x100 + 24].copy_from_slice(&low_descriptor(24, HIGH as u32));
    platform.add_memory(LOW_WINDOW_BASE, low);

    let mut high = vec![0u8; (ADDRESS_SPACE_TOP - HIGH) as usize];
    let code = high_descriptor(0, 0x400, 0x80);
    high[0x200..0x200 + code.len()].copy_from_slice(&code);
    platform.add_memory(HIGH, high);

    (Arc::new(platform), model, fw)
}

/// Plataforma sem descritores, para registro direto do modelo.
pub fn model_platform(model: BoardModel) -> (Arc<FakePlatform>, Arc<BoardModel>, Arc<StubFirmware>) {
    let (model, fw) = model.into_firmware();
    (Arc::new(FakePlatform::new()), model, fw)
}
