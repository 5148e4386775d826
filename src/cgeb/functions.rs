//! # CGEB Function Numbers
//!
//! Catálogo das funções expostas pelo firmware. O número vai em `Fps::fct`.
//!
//! | Range | Categoria                        |
//! |-------|----------------------------------|
//! | 0-9   | Sessão, versão, memória, delay   |
//! | 10-13 | Board controller (CGBC)          |
//! | 14-17 | Board                            |
//! | 18-28 | VGA / backlight                  |
//! | 29-34 | Storage areas                    |
//! | 35-40 | I2C                              |
//! | 41-46 | GPIO                             |
//! | 47-51 | Watchdog                         |
//! | 52-56 | Performance                      |
//! | 57-68 | Sensores (temperatura/fan/tensão)|
//! | 69-71 | Lock de storage areas            |

// =============================================================================
// SESSÃO / VERSÃO (0 - 9)
// =============================================================================

pub const CGEB_GET_CGEB_VERSION: u32 = 0;
pub const CGEB_GET_SYS_BIOS_VERSION: u32 = 1;
pub const CGEB_GET_VGA_BIOS_VERSION: u32 = 2;
pub const CGEB_GET_DATA_SIZE: u32 = 3;
pub const CGEB_OPEN: u32 = 4;
pub const CGEB_CLOSE: u32 = 5;
pub const CGEB_MAP_GET_MEM: u32 = 6;
pub const CGEB_MAP_CHANGED: u32 = 7;
pub const CGEB_MAP_GET_PORTS: u32 = 8;
pub const CGEB_DELAY_US: u32 = 9;

// =============================================================================
// BOARD CONTROLLER (10 - 13)
// =============================================================================

pub const CGEB_CGBC_READ_WRITE: u32 = 10;
pub const CGEB_CGBC_SET_CONTROL: u32 = 11;
pub const CGEB_CGBC_GET_INFO: u32 = 12;
pub const CGEB_CGBC_HANDLE_COMMAND: u32 = 13;

// =============================================================================
// BOARD (14 - 17)
// =============================================================================

pub const CGEB_BOARD_GET_INFO: u32 = 14;
pub const CGEB_BOARD_GET_BOOT_COUNTER: u32 = 15;
pub const CGEB_BOARD_GET_RUNNING_TIME_METER: u32 = 16;
pub const CGEB_BOARD_GET_BOOT_ERROR_LOG: u32 = 17;

// =============================================================================
// VGA (18 - 28)
// =============================================================================

pub const CGEB_VGA_COUNT: u32 = 18;
pub const CGEB_VGA_GET_INFO: u32 = 19;
pub const CGEB_VGA_GET_CONTRAST: u32 = 20;
pub const CGEB_VGA_SET_CONTRAST: u32 = 21;
pub const CGEB_VGA_GET_CONTRAST_ENABLE: u32 = 22;
pub const CGEB_VGA_SET_CONTRAST_ENABLE: u32 = 23;
pub const CGEB_VGA_GET_BACKLIGHT: u32 = 24;
pub const CGEB_VGA_SET_BACKLIGHT: u32 = 25;
pub const CGEB_VGA_GET_BACKLIGHT_ENABLE: u32 = 26;
pub const CGEB_VGA_SET_BACKLIGHT_ENABLE: u32 = 27;
pub const CGEB_VGA_END_DARK_BOOT: u32 = 28;

// =============================================================================
// STORAGE AREAS (29 - 34)
// =============================================================================

pub const CGEB_STORAGE_AREA_COUNT: u32 = 29;
pub const CGEB_STORAGE_AREA_GET_INFO: u32 = 30;
pub const CGEB_STORAGE_AREA_READ: u32 = 31;
pub const CGEB_STORAGE_AREA_WRITE: u32 = 32;
pub const CGEB_STORAGE_AREA_ERASE: u32 = 33;
pub const CGEB_STORAGE_AREA_ERASE_STATUS: u32 = 34;

// =============================================================================
// I2C (35 - 40)
// =============================================================================

pub const CGEB_I2C_COUNT: u32 = 35;
pub const CGEB_I2C_GET_INFO: u32 = 36;
pub const CGEB_I2C_GET_ADDR_LIST: u32 = 37;
pub const CGEB_I2C_TRANSFER: u32 = 38;
pub const CGEB_I2C_GET_FREQUENCY: u32 = 39;
pub const CGEB_I2C_SET_FREQUENCY: u32 = 40;

// =============================================================================
// GPIO (41 - 46)
// =============================================================================

pub const CGEB_IO_COUNT: u32 = 41;
pub const CGEB_IO_GET_INFO: u32 = 42;
pub const CGEB_IO_READ: u32 = 43;
pub const CGEB_IO_WRITE: u32 = 44;
pub const CGEB_IO_GET_DIRECTION: u32 = 45;
pub const CGEB_IO_SET_DIRECTION: u32 = 46;

// =============================================================================
// WATCHDOG (47 - 51)
// =============================================================================

pub const CGEB_WDOG_COUNT: u32 = 47;
pub const CGEB_WDOG_GET_INFO: u32 = 48;
pub const CGEB_WDOG_TRIGGER: u32 = 49;
pub const CGEB_WDOG_GET_CONFIG: u32 = 50;
pub const CGEB_WDOG_SET_CONFIG: u32 = 51;

// =============================================================================
// PERFORMANCE (52 - 56)
// =============================================================================

pub const CGEB_PERFORMANCE_GET_CURRENT: u32 = 52;
pub const CGEB_PERFORMANCE_SET_CURRENT: u32 = 53;
pub const CGEB_PERFORMANCE_GET_POLICY_CAPS: u32 = 54;
pub const CGEB_PERFORMANCE_GET_POLICY: u32 = 55;
pub const CGEB_PERFORMANCE_SET_POLICY: u32 = 56;

// =============================================================================
// SENSORES (57 - 68)
// =============================================================================

pub const CGEB_TEMPERATURE_COUNT: u32 = 57;
pub const CGEB_TEMPERATURE_GET_INFO: u32 = 58;
pub const CGEB_TEMPERATURE_GET_CURRENT: u32 = 59;
pub const CGEB_TEMPERATURE_SET_LIMITS: u32 = 60;
pub const CGEB_FAN_COUNT: u32 = 61;
pub const CGEB_FAN_GET_INFO: u32 = 62;
pub const CGEB_FAN_GET_CURRENT: u32 = 63;
pub const CGEB_FAN_SET_LIMITS: u32 = 64;
pub const CGEB_VOLTAGE_COUNT: u32 = 65;
pub const CGEB_VOLTAGE_GET_INFO: u32 = 66;
pub const CGEB_VOLTAGE_GET_CURRENT: u32 = 67;
pub const CGEB_VOLTAGE_SET_LIMITS: u32 = 68;

// =============================================================================
// LOCK DE STORAGE AREAS (69 - 71)
// =============================================================================

pub const CGEB_STORAGE_AREA_LOCK: u32 = 69;
pub const CGEB_STORAGE_AREA_UNLOCK: u32 = 70;
pub const CGEB_STORAGE_AREA_IS_LOCKED: u32 = 71;

/// Total de funções conhecidas
pub const CGEB_FUNCTION_COUNT: u32 = 72;

// =============================================================================
// VERSÃO
// =============================================================================

/// Major de interface suportado por este driver
pub const CGEB_VERSION_MAJOR: u32 = 1;

/// Extrai o major de uma versão `major.minor.build` empacotada (major em 31..24)
#[inline]
pub const fn version_major(version: u32) -> u32 {
    version >> 24
}
