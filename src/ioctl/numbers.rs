//! # Opcodes CGOS
//!
//! Catálogo das operações do envelope. O opcode é também o índice na tabela
//! de dispatch.
//!
//! | Faixa | Categoria                          |
//! |-------|------------------------------------|
//! | 0-12  | Driver / board                     |
//! | 13-23 | VGA                                |
//! | 24-34 | Storage areas                      |
//! | 35-46 | I2C                                |
//! | 47-55 | GPIO                               |
//! | 56-65 | Watchdog                           |
//! | 66-82 | Performance / sensores             |
//! | 83-86 | Board controller (CGBC)            |
//! | 87-89 | Versões                            |

// ============================================================================
// DRIVER / BOARD
// ============================================================================

pub const CGOS_GET_DRV_VERSION: u32 = 0;
pub const CGOS_GET_DRV_INFO: u32 = 1;
/// unit = classe (0 = todas)
pub const CGOS_BOARD_COUNT: u32 = 2;
/// unit = classe, pars[0] = índice
pub const CGOS_BOARD_OPEN: u32 = 3;
/// Cauda de entrada = nome
pub const CGOS_BOARD_OPEN_BY_NAME: u32 = 4;
pub const CGOS_BOARD_CLOSE: u32 = 5;
pub const CGOS_BOARD_GET_NAME: u32 = 6;
pub const CGOS_BOARD_GET_INFO: u32 = 7;
pub const CGOS_BOARD_GET_BOOT_COUNTER: u32 = 8;
pub const CGOS_BOARD_GET_RUNNING_TIME_METER: u32 = 9;
pub const CGOS_BOARD_GET_OPTION: u32 = 10;
pub const CGOS_BOARD_SET_OPTION: u32 = 11;
pub const CGOS_BOARD_GET_BOOT_ERROR_LOG: u32 = 12;

// ============================================================================
// VGA
// ============================================================================

pub const CGOS_VGA_COUNT: u32 = 13;
pub const CGOS_VGA_GET_CONTRAST: u32 = 14;
pub const CGOS_VGA_SET_CONTRAST: u32 = 15;
pub const CGOS_VGA_GET_CONTRAST_ENABLE: u32 = 16;
pub const CGOS_VGA_SET_CONTRAST_ENABLE: u32 = 17;
pub const CGOS_VGA_GET_BACKLIGHT: u32 = 18;
pub const CGOS_VGA_SET_BACKLIGHT: u32 = 19;
pub const CGOS_VGA_GET_BACKLIGHT_ENABLE: u32 = 20;
pub const CGOS_VGA_SET_BACKLIGHT_ENABLE: u32 = 21;
pub const CGOS_VGA_END_DARK_BOOT: u32 = 22;
pub const CGOS_VGA_GET_INFO: u32 = 23;

// ============================================================================
// STORAGE AREAS
// ============================================================================

pub const CGOS_STORAGE_AREA_COUNT: u32 = 24;
pub const CGOS_STORAGE_AREA_TYPE: u32 = 25;
pub const CGOS_STORAGE_AREA_SIZE: u32 = 26;
pub const CGOS_STORAGE_AREA_BLOCK_SIZE: u32 = 27;
/// pars[0] = offset, pars[1] = bytes
pub const CGOS_STORAGE_AREA_READ: u32 = 28;
/// pars[0] = offset, pars[1] = bytes, cauda de entrada = dados
pub const CGOS_STORAGE_AREA_WRITE: u32 = 29;
pub const CGOS_STORAGE_AREA_ERASE: u32 = 30;
pub const CGOS_STORAGE_AREA_ERASE_STATUS: u32 = 31;
pub const CGOS_STORAGE_AREA_LOCK: u32 = 32;
pub const CGOS_STORAGE_AREA_UNLOCK: u32 = 33;
pub const CGOS_STORAGE_AREA_IS_LOCKED: u32 = 34;

// ============================================================================
// I2C
// ============================================================================

pub const CGOS_I2C_COUNT: u32 = 35;
pub const CGOS_I2C_TYPE: u32 = 36;
pub const CGOS_I2C_IS_AVAILABLE: u32 = 37;
pub const CGOS_I2C_READ: u32 = 38;
pub const CGOS_I2C_WRITE: u32 = 39;
pub const CGOS_I2C_READ_REGISTER: u32 = 40;
pub const CGOS_I2C_WRITE_REGISTER: u32 = 41;
pub const CGOS_I2C_WRITE_READ_COMBINED: u32 = 42;
pub const CGOS_I2C_GET_MAX_FREQUENCY: u32 = 43;
pub const CGOS_I2C_GET_FREQUENCY: u32 = 44;
pub const CGOS_I2C_SET_FREQUENCY: u32 = 45;
pub const CGOS_I2C_GET_ADDR_LIST: u32 = 46;

// ============================================================================
// GPIO
// ============================================================================

pub const CGOS_IO_COUNT: u32 = 47;
pub const CGOS_IO_IS_AVAILABLE: u32 = 48;
pub const CGOS_IO_READ: u32 = 49;
pub const CGOS_IO_WRITE: u32 = 50;
/// pars = [xor, and, xor]
pub const CGOS_IO_XOR_AND_XOR: u32 = 51;
pub const CGOS_IO_GET_DIRECTION: u32 = 52;
pub const CGOS_IO_SET_DIRECTION: u32 = 53;
pub const CGOS_IO_GET_DIRECTION_CAPS: u32 = 54;
pub const CGOS_IO_GET_NAME: u32 = 55;

// ============================================================================
// WATCHDOG
// ============================================================================

pub const CGOS_WDOG_COUNT: u32 = 56;
pub const CGOS_WDOG_IS_AVAILABLE: u32 = 57;
pub const CGOS_WDOG_TRIGGER: u32 = 58;
pub const CGOS_WDOG_GET_TRIGGER_COUNT: u32 = 59;
pub const CGOS_WDOG_SET_TRIGGER_COUNT: u32 = 60;
/// Cauda = palavras u32 da configuração (ecoadas na saída)
pub const CGOS_WDOG_GET_CONFIG_STRUCT: u32 = 61;
pub const CGOS_WDOG_SET_CONFIG_STRUCT: u32 = 62;
pub const CGOS_WDOG_SET_CONFIG: u32 = 63;
pub const CGOS_WDOG_DISABLE: u32 = 64;
pub const CGOS_WDOG_GET_INFO: u32 = 65;

// ============================================================================
// PERFORMANCE / SENSORES
// ============================================================================

pub const CGOS_PERFORMANCE_GET_CURRENT: u32 = 66;
pub const CGOS_PERFORMANCE_SET_CURRENT: u32 = 67;
pub const CGOS_PERFORMANCE_GET_POLICY_CAPS: u32 = 68;
pub const CGOS_PERFORMANCE_GET_POLICY: u32 = 69;
pub const CGOS_PERFORMANCE_SET_POLICY: u32 = 70;
pub const CGOS_TEMPERATURE_COUNT: u32 = 71;
pub const CGOS_TEMPERATURE_GET_INFO: u32 = 72;
pub const CGOS_TEMPERATURE_GET_CURRENT: u32 = 73;
pub const CGOS_TEMPERATURE_SET_LIMITS: u32 = 74;
pub const CGOS_FAN_COUNT: u32 = 75;
pub const CGOS_FAN_GET_INFO: u32 = 76;
pub const CGOS_FAN_GET_CURRENT: u32 = 77;
pub const CGOS_FAN_SET_LIMITS: u32 = 78;
pub const CGOS_VOLTAGE_COUNT: u32 = 79;
pub const CGOS_VOLTAGE_GET_INFO: u32 = 80;
pub const CGOS_VOLTAGE_GET_CURRENT: u32 = 81;
pub const CGOS_VOLTAGE_SET_LIMITS: u32 = 82;

// ============================================================================
// CGBC
// ============================================================================

pub const CGOS_CGBC_GET_INFO: u32 = 83;
pub const CGOS_CGBC_SET_CONTROL: u32 = 84;
/// pars[1] = bytes de resposta
pub const CGOS_CGBC_READ_WRITE: u32 = 85;
pub const CGOS_CGBC_HANDLE_COMMAND: u32 = 86;

// ============================================================================
// VERSÕES
// ============================================================================

pub const CGOS_BOARD_GET_BIOS_VERSION: u32 = 87;
pub const CGOS_CGEB_GET_VERSION: u32 = 88;
pub const CGOS_VGA_GET_BIOS_VERSION: u32 = 89;

/// Número de opcodes (tamanho da tabela)
pub const CGOS_OPCODE_COUNT: usize = 90;
