//! # Tabela de Dispatch
//!
//! Tabela estática indexada por opcode. Cada entrada declara o próprio
//! contrato: tamanhos mínimos das caudas, flags, classe de unidade e ação.
//!
//! Nas passagens diretas ao firmware a forma da chamada diz onde fica a
//! quantidade de bytes de saída (ver `OutputShape`); isso varia por opcode.
//! Do lado da entrada, `InputShape` diz quanto da cauda o firmware vai ler.

use super::Call;
use crate::cgeb::functions::*;
use crate::cgeb::reply::le_u32;
use crate::cgeb::{InvokeFlags, OutputShape};
use crate::ioctl::error::CgosResult;
use crate::ioctl::handlers::{board, driver, i2c, io, storage, wdog};
use crate::ioctl::numbers::*;
use bitflags::bitflags;

bitflags! {
    /// Requisitos de uma operação.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpFlags: u32 {
        /// Handle de board opcional
        const NO_HANDLE = 1 << 0;
        /// Campo `unit` precisa ser 0
        const TYPE_ZERO = 1 << 1;
    }
}

/// Caminho de resolução da unidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    None,
    Storage,
    I2c,
    Vga,
    Io,
    Wdog,
}

/// Forma de uma passagem direta ao firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwCall {
    Par(InvokeFlags),
    Envelope(OutputShape),
    /// Cauda de entrada = palavras u32 estendidas
    Bulk { echo: bool },
}

/// Quanto da cauda de entrada o firmware lê por `iptr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// A cauda inteira
    Tail,
    /// `pars[i]` bytes
    CountInPar(usize),
    /// Registro cujo primeiro u32 é o próprio tamanho
    EmbeddedLength,
}

impl InputShape {
    /// Bytes que o firmware vai ler, se cabem em `input`.
    pub fn declared(self, pars: &[u32; 4], input: &[u8]) -> Option<usize> {
        let wanted = match self {
            Self::Tail => input.len(),
            Self::CountInPar(i) => *pars.get(i)? as usize,
            Self::EmbeddedLength => le_u32(input, 0)? as usize,
        };
        (wanted <= input.len()).then_some(wanted)
    }
}

/// Handler local
pub type LocalHandler = fn(&mut Call<'_>) -> CgosResult<()>;

#[derive(Clone, Copy)]
pub enum Action {
    Local(LocalHandler),
    Firmware { fct: u32, call: FwCall },
    /// Sucesso sem efeito
    Stub,
    NotImplemented,
}

/// Entrada da tabela.
#[derive(Clone, Copy)]
pub struct OpEntry {
    /// Precisa ser igual ao índice na tabela
    pub opcode: u32,
    pub min_in: usize,
    pub min_out: usize,
    pub flags: OpFlags,
    pub class: UnitClass,
    pub input: InputShape,
    pub action: Action,
}

impl OpEntry {
    pub const fn not_implemented(opcode: u32) -> Self {
        Self {
            opcode,
            min_in: 0,
            min_out: 0,
            flags: OpFlags::empty(),
            class: UnitClass::None,
            input: InputShape::Tail,
            action: Action::NotImplemented,
        }
    }

    pub const fn local(opcode: u32, handler: LocalHandler) -> Self {
        Self::not_implemented(opcode).action(Action::Local(handler))
    }

    pub const fn stub(opcode: u32) -> Self {
        Self::not_implemented(opcode).action(Action::Stub)
    }

    pub const fn par(opcode: u32, fct: u32, flags: InvokeFlags) -> Self {
        Self::not_implemented(opcode).action(Action::Firmware {
            fct,
            call: FwCall::Par(flags),
        })
    }

    pub const fn envelope(opcode: u32, fct: u32, shape: OutputShape) -> Self {
        Self::not_implemented(opcode).action(Action::Firmware {
            fct,
            call: FwCall::Envelope(shape),
        })
    }

    pub const fn bulk(opcode: u32, fct: u32, echo: bool) -> Self {
        Self::not_implemented(opcode).action(Action::Firmware {
            fct,
            call: FwCall::Bulk { echo },
        })
    }

    const fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub const fn class(mut self, class: UnitClass) -> Self {
        self.class = class;
        self
    }

    pub const fn flags(mut self, flags: OpFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn input(mut self, shape: InputShape) -> Self {
        self.input = shape;
        self
    }

    pub const fn min_in(mut self, len: usize) -> Self {
        self.min_in = len;
        self
    }

    pub const fn min_out(mut self, len: usize) -> Self {
        self.min_out = len;
        self
    }
}

// Atalhos para a tabela
const R0: InvokeFlags = InvokeFlags::RETS0;
const NONE: InvokeFlags = InvokeFlags::empty();
const NH: OpFlags = OpFlags::NO_HANDLE;
const TZ: OpFlags = OpFlags::TYPE_ZERO;
const NH_TZ: OpFlags = OpFlags::NO_HANDLE.union(OpFlags::TYPE_ZERO);

use OutputShape::{CountInPar, CountInRets0, EmbeddedLength, Empty};
use UnitClass::{Io, Storage, Vga, Wdog};

/// Tabela de operações.
///
/// Opcodes sem entrada explícita ficam como `NotImplemented`.
pub static OP_TABLE: [OpEntry; CGOS_OPCODE_COUNT] = {
    let mut t = [OpEntry::not_implemented(0); CGOS_OPCODE_COUNT];
    let mut i = 0;
    while i < CGOS_OPCODE_COUNT {
        t[i] = OpEntry::not_implemented(i as u32);
        i += 1;
    }

    // === DRIVER / BOARD ===
    t[CGOS_GET_DRV_VERSION as usize] =
        OpEntry::local(CGOS_GET_DRV_VERSION, driver::op_get_drv_version).flags(NH_TZ);
    t[CGOS_GET_DRV_INFO as usize] = OpEntry::local(CGOS_GET_DRV_INFO, driver::op_get_drv_info).flags(NH);
    t[CGOS_BOARD_COUNT as usize] = OpEntry::local(CGOS_BOARD_COUNT, driver::op_board_count).flags(NH);
    t[CGOS_BOARD_OPEN as usize] = OpEntry::local(CGOS_BOARD_OPEN, driver::op_board_open).flags(NH);
    t[CGOS_BOARD_OPEN_BY_NAME as usize] =
        OpEntry::local(CGOS_BOARD_OPEN_BY_NAME, driver::op_board_open_by_name)
            .flags(NH_TZ)
            .min_in(1);
    t[CGOS_BOARD_CLOSE as usize] = OpEntry::stub(CGOS_BOARD_CLOSE);
    t[CGOS_BOARD_GET_NAME as usize] =
        OpEntry::local(CGOS_BOARD_GET_NAME, board::op_board_get_name).min_out(1);
    t[CGOS_BOARD_GET_INFO as usize] =
        OpEntry::local(CGOS_BOARD_GET_INFO, board::op_board_get_info).min_out(4);
    t[CGOS_BOARD_GET_BOOT_COUNTER as usize] =
        OpEntry::par(CGOS_BOARD_GET_BOOT_COUNTER, CGEB_BOARD_GET_BOOT_COUNTER, R0);
    t[CGOS_BOARD_GET_RUNNING_TIME_METER as usize] =
        OpEntry::par(CGOS_BOARD_GET_RUNNING_TIME_METER, CGEB_BOARD_GET_RUNNING_TIME_METER, R0);
    t[CGOS_BOARD_GET_BOOT_ERROR_LOG as usize] =
        OpEntry::envelope(CGOS_BOARD_GET_BOOT_ERROR_LOG, CGEB_BOARD_GET_BOOT_ERROR_LOG, CountInRets0);

    // === VGA ===
    t[CGOS_VGA_COUNT as usize] = OpEntry::par(CGOS_VGA_COUNT, CGEB_VGA_COUNT, R0).flags(TZ);
    t[CGOS_VGA_GET_CONTRAST as usize] =
        OpEntry::par(CGOS_VGA_GET_CONTRAST, CGEB_VGA_GET_CONTRAST, R0).class(Vga);
    t[CGOS_VGA_SET_CONTRAST as usize] =
        OpEntry::par(CGOS_VGA_SET_CONTRAST, CGEB_VGA_SET_CONTRAST, NONE).class(Vga);
    t[CGOS_VGA_GET_CONTRAST_ENABLE as usize] =
        OpEntry::par(CGOS_VGA_GET_CONTRAST_ENABLE, CGEB_VGA_GET_CONTRAST_ENABLE, R0).class(Vga);
    t[CGOS_VGA_SET_CONTRAST_ENABLE as usize] =
        OpEntry::par(CGOS_VGA_SET_CONTRAST_ENABLE, CGEB_VGA_SET_CONTRAST_ENABLE, NONE).class(Vga);
    t[CGOS_VGA_GET_BACKLIGHT as usize] =
        OpEntry::par(CGOS_VGA_GET_BACKLIGHT, CGEB_VGA_GET_BACKLIGHT, R0).class(Vga);
    t[CGOS_VGA_SET_BACKLIGHT as usize] =
        OpEntry::par(CGOS_VGA_SET_BACKLIGHT, CGEB_VGA_SET_BACKLIGHT, NONE).class(Vga);
    t[CGOS_VGA_GET_BACKLIGHT_ENABLE as usize] =
        OpEntry::par(CGOS_VGA_GET_BACKLIGHT_ENABLE, CGEB_VGA_GET_BACKLIGHT_ENABLE, R0).class(Vga);
    t[CGOS_VGA_SET_BACKLIGHT_ENABLE as usize] =
        OpEntry::par(CGOS_VGA_SET_BACKLIGHT_ENABLE, CGEB_VGA_SET_BACKLIGHT_ENABLE, NONE).class(Vga);
    t[CGOS_VGA_END_DARK_BOOT as usize] =
        OpEntry::par(CGOS_VGA_END_DARK_BOOT, CGEB_VGA_END_DARK_BOOT, NONE).flags(TZ);
    t[CGOS_VGA_GET_INFO as usize] = OpEntry::envelope(CGOS_VGA_GET_INFO, CGEB_VGA_GET_INFO, EmbeddedLength)
        .class(Vga)
        .min_out(4);

    // === STORAGE AREAS ===
    t[CGOS_STORAGE_AREA_COUNT as usize] =
        OpEntry::local(CGOS_STORAGE_AREA_COUNT, storage::op_storage_count);
    t[CGOS_STORAGE_AREA_TYPE as usize] =
        OpEntry::local(CGOS_STORAGE_AREA_TYPE, storage::op_storage_type).class(Storage);
    t[CGOS_STORAGE_AREA_SIZE as usize] =
        OpEntry::local(CGOS_STORAGE_AREA_SIZE, storage::op_storage_size).class(Storage);
    t[CGOS_STORAGE_AREA_BLOCK_SIZE as usize] =
        OpEntry::local(CGOS_STORAGE_AREA_BLOCK_SIZE, storage::op_storage_block_size).class(Storage);
    t[CGOS_STORAGE_AREA_READ as usize] =
        OpEntry::local(CGOS_STORAGE_AREA_READ, storage::op_storage_read).class(Storage);
    t[CGOS_STORAGE_AREA_WRITE as usize] =
        OpEntry::local(CGOS_STORAGE_AREA_WRITE, storage::op_storage_write).class(Storage);
    t[CGOS_STORAGE_AREA_ERASE as usize] =
        OpEntry::local(CGOS_STORAGE_AREA_ERASE, storage::op_storage_erase).class(Storage);
    t[CGOS_STORAGE_AREA_ERASE_STATUS as usize] =
        OpEntry::par(CGOS_STORAGE_AREA_ERASE_STATUS, CGEB_STORAGE_AREA_ERASE_STATUS, R0).class(Storage);
    t[CGOS_STORAGE_AREA_LOCK as usize] =
        OpEntry::envelope(CGOS_STORAGE_AREA_LOCK, CGEB_STORAGE_AREA_LOCK, Empty).class(Storage);
    t[CGOS_STORAGE_AREA_UNLOCK as usize] =
        OpEntry::envelope(CGOS_STORAGE_AREA_UNLOCK, CGEB_STORAGE_AREA_UNLOCK, Empty).class(Storage);
    t[CGOS_STORAGE_AREA_IS_LOCKED as usize] =
        OpEntry::par(CGOS_STORAGE_AREA_IS_LOCKED, CGEB_STORAGE_AREA_IS_LOCKED, R0).class(Storage);

    // === I2C ===
    t[CGOS_I2C_COUNT as usize] = OpEntry::local(CGOS_I2C_COUNT, i2c::op_i2c_count);
    t[CGOS_I2C_TYPE as usize] = OpEntry::local(CGOS_I2C_TYPE, i2c::op_i2c_type).class(UnitClass::I2c);
    t[CGOS_I2C_IS_AVAILABLE as usize] = OpEntry::local(CGOS_I2C_IS_AVAILABLE, i2c::op_i2c_is_available);
    // I2C_TRANSFER: pars = [endereço, bytes a ler, bytes a escrever, -]
    t[CGOS_I2C_READ as usize] =
        OpEntry::envelope(CGOS_I2C_READ, CGEB_I2C_TRANSFER, CountInPar(1)).class(UnitClass::I2c);
    t[CGOS_I2C_WRITE as usize] = OpEntry::envelope(CGOS_I2C_WRITE, CGEB_I2C_TRANSFER, Empty)
        .class(UnitClass::I2c)
        .input(InputShape::CountInPar(2))
        .min_in(1);
    t[CGOS_I2C_READ_REGISTER as usize] =
        OpEntry::par(CGOS_I2C_READ_REGISTER, CGEB_I2C_TRANSFER, R0).class(UnitClass::I2c);
    t[CGOS_I2C_WRITE_REGISTER as usize] =
        OpEntry::par(CGOS_I2C_WRITE_REGISTER, CGEB_I2C_TRANSFER, NONE).class(UnitClass::I2c);
    t[CGOS_I2C_WRITE_READ_COMBINED as usize] =
        OpEntry::envelope(CGOS_I2C_WRITE_READ_COMBINED, CGEB_I2C_TRANSFER, CountInPar(1))
            .class(UnitClass::I2c)
            .input(InputShape::CountInPar(2))
            .min_in(1);
    t[CGOS_I2C_GET_MAX_FREQUENCY as usize] =
        OpEntry::local(CGOS_I2C_GET_MAX_FREQUENCY, i2c::op_i2c_get_max_frequency).class(UnitClass::I2c);
    t[CGOS_I2C_GET_FREQUENCY as usize] =
        OpEntry::par(CGOS_I2C_GET_FREQUENCY, CGEB_I2C_GET_FREQUENCY, R0).class(UnitClass::I2c);
    t[CGOS_I2C_SET_FREQUENCY as usize] =
        OpEntry::par(CGOS_I2C_SET_FREQUENCY, CGEB_I2C_SET_FREQUENCY, NONE).class(UnitClass::I2c);
    t[CGOS_I2C_GET_ADDR_LIST as usize] =
        OpEntry::envelope(CGOS_I2C_GET_ADDR_LIST, CGEB_I2C_GET_ADDR_LIST, CountInRets0).class(UnitClass::I2c);

    // === GPIO ===
    t[CGOS_IO_COUNT as usize] = OpEntry::par(CGOS_IO_COUNT, CGEB_IO_COUNT, R0).flags(TZ);
    t[CGOS_IO_IS_AVAILABLE as usize] = OpEntry::local(CGOS_IO_IS_AVAILABLE, io::op_io_is_available);
    t[CGOS_IO_READ as usize] = OpEntry::par(CGOS_IO_READ, CGEB_IO_READ, R0).class(Io);
    t[CGOS_IO_WRITE as usize] = OpEntry::par(CGOS_IO_WRITE, CGEB_IO_WRITE, NONE).class(Io);
    t[CGOS_IO_XOR_AND_XOR as usize] = OpEntry::local(CGOS_IO_XOR_AND_XOR, io::op_io_xor_and_xor).class(Io);
    t[CGOS_IO_GET_DIRECTION as usize] = OpEntry::par(CGOS_IO_GET_DIRECTION, CGEB_IO_GET_DIRECTION, R0).class(Io);
    t[CGOS_IO_SET_DIRECTION as usize] =
        OpEntry::par(CGOS_IO_SET_DIRECTION, CGEB_IO_SET_DIRECTION, NONE).class(Io);
    // rets = [capacidade de entrada, capacidade de saída]
    t[CGOS_IO_GET_DIRECTION_CAPS as usize] =
        OpEntry::par(CGOS_IO_GET_DIRECTION_CAPS, CGEB_IO_GET_INFO, NONE).class(Io);

    // === WATCHDOG ===
    t[CGOS_WDOG_COUNT as usize] = OpEntry::local(CGOS_WDOG_COUNT, wdog::op_wdog_count).flags(TZ);
    t[CGOS_WDOG_IS_AVAILABLE as usize] = OpEntry::local(CGOS_WDOG_IS_AVAILABLE, wdog::op_wdog_is_available);
    t[CGOS_WDOG_TRIGGER as usize] = OpEntry::par(CGOS_WDOG_TRIGGER, CGEB_WDOG_TRIGGER, NONE).class(Wdog);
    t[CGOS_WDOG_GET_CONFIG_STRUCT as usize] =
        OpEntry::bulk(CGOS_WDOG_GET_CONFIG_STRUCT, CGEB_WDOG_GET_CONFIG, true)
            .class(Wdog)
            .min_in(4);
    t[CGOS_WDOG_SET_CONFIG_STRUCT as usize] =
        OpEntry::bulk(CGOS_WDOG_SET_CONFIG_STRUCT, CGEB_WDOG_SET_CONFIG, false)
            .class(Wdog)
            .min_in(4);
    t[CGOS_WDOG_SET_CONFIG as usize] =
        OpEntry::par(CGOS_WDOG_SET_CONFIG, CGEB_WDOG_SET_CONFIG, NONE).class(Wdog);
    t[CGOS_WDOG_DISABLE as usize] = OpEntry::local(CGOS_WDOG_DISABLE, wdog::op_wdog_disable).class(Wdog);
    t[CGOS_WDOG_GET_INFO as usize] = OpEntry::envelope(CGOS_WDOG_GET_INFO, CGEB_WDOG_GET_INFO, EmbeddedLength)
        .class(Wdog)
        .min_out(4);

    // === PERFORMANCE ===
    t[CGOS_PERFORMANCE_GET_CURRENT as usize] =
        OpEntry::par(CGOS_PERFORMANCE_GET_CURRENT, CGEB_PERFORMANCE_GET_CURRENT, R0);
    t[CGOS_PERFORMANCE_SET_CURRENT as usize] =
        OpEntry::par(CGOS_PERFORMANCE_SET_CURRENT, CGEB_PERFORMANCE_SET_CURRENT, NONE);
    t[CGOS_PERFORMANCE_GET_POLICY_CAPS as usize] =
        OpEntry::par(CGOS_PERFORMANCE_GET_POLICY_CAPS, CGEB_PERFORMANCE_GET_POLICY_CAPS, R0);
    t[CGOS_PERFORMANCE_GET_POLICY as usize] =
        OpEntry::par(CGOS_PERFORMANCE_GET_POLICY, CGEB_PERFORMANCE_GET_POLICY, R0);
    t[CGOS_PERFORMANCE_SET_POLICY as usize] =
        OpEntry::par(CGOS_PERFORMANCE_SET_POLICY, CGEB_PERFORMANCE_SET_POLICY, NONE);

    // === SENSORES ===
    // GET_CURRENT devolve [valor, status do sensor] em rets
    t[CGOS_TEMPERATURE_COUNT as usize] =
        OpEntry::par(CGOS_TEMPERATURE_COUNT, CGEB_TEMPERATURE_COUNT, R0).flags(TZ);
    t[CGOS_TEMPERATURE_GET_INFO as usize] =
        OpEntry::envelope(CGOS_TEMPERATURE_GET_INFO, CGEB_TEMPERATURE_GET_INFO, EmbeddedLength).min_out(4);
    t[CGOS_TEMPERATURE_GET_CURRENT as usize] =
        OpEntry::par(CGOS_TEMPERATURE_GET_CURRENT, CGEB_TEMPERATURE_GET_CURRENT, NONE);
    t[CGOS_TEMPERATURE_SET_LIMITS as usize] =
        OpEntry::envelope(CGOS_TEMPERATURE_SET_LIMITS, CGEB_TEMPERATURE_SET_LIMITS, Empty)
            .input(InputShape::EmbeddedLength)
            .min_in(4);
    t[CGOS_FAN_COUNT as usize] = OpEntry::par(CGOS_FAN_COUNT, CGEB_FAN_COUNT, R0).flags(TZ);
    t[CGOS_FAN_GET_INFO as usize] =
        OpEntry::envelope(CGOS_FAN_GET_INFO, CGEB_FAN_GET_INFO, EmbeddedLength).min_out(4);
    t[CGOS_FAN_GET_CURRENT as usize] = OpEntry::par(CGOS_FAN_GET_CURRENT, CGEB_FAN_GET_CURRENT, NONE);
    t[CGOS_FAN_SET_LIMITS as usize] =
        OpEntry::envelope(CGOS_FAN_SET_LIMITS, CGEB_FAN_SET_LIMITS, Empty)
            .input(InputShape::EmbeddedLength)
            .min_in(4);
    t[CGOS_VOLTAGE_COUNT as usize] = OpEntry::par(CGOS_VOLTAGE_COUNT, CGEB_VOLTAGE_COUNT, R0).flags(TZ);
    t[CGOS_VOLTAGE_GET_INFO as usize] =
        OpEntry::envelope(CGOS_VOLTAGE_GET_INFO, CGEB_VOLTAGE_GET_INFO, EmbeddedLength).min_out(4);
    t[CGOS_VOLTAGE_GET_CURRENT as usize] =
        OpEntry::par(CGOS_VOLTAGE_GET_CURRENT, CGEB_VOLTAGE_GET_CURRENT, NONE);
    t[CGOS_VOLTAGE_SET_LIMITS as usize] =
        OpEntry::envelope(CGOS_VOLTAGE_SET_LIMITS, CGEB_VOLTAGE_SET_LIMITS, Empty)
            .input(InputShape::EmbeddedLength)
            .min_in(4);

    // === CGBC ===
    t[CGOS_CGBC_GET_INFO as usize] =
        OpEntry::envelope(CGOS_CGBC_GET_INFO, CGEB_CGBC_GET_INFO, EmbeddedLength).min_out(4);
    t[CGOS_CGBC_SET_CONTROL as usize] = OpEntry::par(CGOS_CGBC_SET_CONTROL, CGEB_CGBC_SET_CONTROL, R0);
    t[CGOS_CGBC_READ_WRITE as usize] =
        OpEntry::envelope(CGOS_CGBC_READ_WRITE, CGEB_CGBC_READ_WRITE, CountInPar(1))
            .input(InputShape::CountInPar(1));
    t[CGOS_CGBC_HANDLE_COMMAND as usize] =
        OpEntry::envelope(CGOS_CGBC_HANDLE_COMMAND, CGEB_CGBC_HANDLE_COMMAND, CountInPar(1))
            .input(InputShape::CountInPar(1));

    // === VERSÕES ===
    t[CGOS_BOARD_GET_BIOS_VERSION as usize] =
        OpEntry::local(CGOS_BOARD_GET_BIOS_VERSION, board::op_bios_version).flags(TZ);
    t[CGOS_CGEB_GET_VERSION as usize] =
        OpEntry::local(CGOS_CGEB_GET_VERSION, board::op_cgeb_version).flags(TZ);
    t[CGOS_VGA_GET_BIOS_VERSION as usize] =
        OpEntry::par(CGOS_VGA_GET_BIOS_VERSION, CGEB_GET_VGA_BIOS_VERSION, R0).flags(TZ);

    t
};
