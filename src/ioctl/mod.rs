//! # Interface CGOS (IOCTL)
//!
//! Ponto de entrada genérico requisição/resposta. O transporte (device de
//! caracteres, socket, teste) entrega bytes crus; o driver devolve um
//! [`CgosReply`] e escreve a resposta no buffer de saída.
//!
//! ## Módulos
//!
//! | Módulo     | Responsabilidade                         |
//! |------------|------------------------------------------|
//! | `abi`      | Layout do envelope                       |
//! | `numbers`  | Opcodes                                  |
//! | `dispatch` | Máquina de estados e tabela de operações |
//! | `handlers` | Operações tratadas pelo driver           |
//! | `error`    | Códigos de status                        |

pub mod abi;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod numbers;

pub use abi::CGOS_IOCTL;
pub use dispatch::{CgosReply, Origin};

use crate::board::{Board, BoardRegistry};
use crate::cgeb::FirmwareEntry;
use crate::core::config::DriverConfig;
use crate::hal::Platform;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use dispatch::OP_TABLE;
use error::{CgosError, CgosResult};

/// Driver CGOS: boards registradas + dispatcher.
pub struct CgosDriver {
    registry: BoardRegistry,
    config: DriverConfig,
}

impl CgosDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            registry: BoardRegistry::new(config.max_boards),
            config,
        }
    }

    // =========================================================================
    // BOARDS
    // =========================================================================

    /// Descobre o firmware na memória física e registra a board.
    ///
    /// Devolve o handle (1-based).
    pub fn probe(&mut self, platform: Arc<dyn Platform>) -> CgosResult<u32> {
        self.ensure_room()?;
        let board = Board::probe(platform, &self.config)?;
        self.add_board(board)
    }

    /// Registra um ponto de entrada fornecido pelo chamador.
    ///
    /// `data_size == 0` pede o tamanho ao firmware.
    pub fn register_entry(
        &mut self,
        platform: Arc<dyn Platform>,
        entry: Box<dyn FirmwareEntry>,
        data_size: u32,
    ) -> CgosResult<u32> {
        self.ensure_room()?;
        let board = Board::with_entry(platform, entry, data_size, &self.config)?;
        self.add_board(board)
    }

    pub fn add_board(&mut self, board: Board) -> CgosResult<u32> {
        let handle = self.registry.register(board)?;
        crate::kinfo!("(CGOS) Board registrada handle=", dec handle);
        Ok(handle)
    }

    /// Falha antes de abrir uma sessão que não poderia ser registrada.
    fn ensure_room(&self) -> CgosResult<()> {
        if self.registry.len() >= self.registry.capacity() {
            crate::kwarn!("(CGOS) Registro cheio, probe ignorado");
            return Err(CgosError::Error);
        }
        Ok(())
    }

    pub fn registry(&self) -> &BoardRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    // =========================================================================
    // REQUISIÇÕES
    // =========================================================================

    /// Processa uma requisição com buffers distintos.
    pub fn ioctl(&self, code: u32, input: &[u8], output: &mut [u8]) -> CgosReply {
        dispatch::run(&OP_TABLE, &self.registry, code, input, output)
    }

    /// Processa uma requisição cujo buffer serve de entrada e saída.
    ///
    /// Os primeiros `in_len` bytes de `buf` são a requisição. Ela é copiada
    /// inteira antes do dispatch, então a resposta pode sobrescrevê-la.
    pub fn ioctl_in_place(&self, code: u32, buf: &mut [u8], in_len: usize) -> CgosReply {
        // Tamanho inconsistente vira entrada vazia (rejeitada no VALIDATE)
        let input: Vec<u8> = buf.get(..in_len).map(<[u8]>::to_vec).unwrap_or_default();
        self.ioctl(code, &input, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::resolve::I2C_TYPE_SMB;
    use crate::board::storage::STORAGE_EEPROM;
    use crate::cgeb::functions::{CGEB_OPEN, CGEB_STORAGE_AREA_WRITE};
    use crate::cgeb::reply::BOARD_INFO_SIZE;
    use crate::ioctl::abi::{Request, RESPONSE_HEADER_LEN};
    use crate::ioctl::numbers::*;
    use crate::testing::{
        discoverable_platform, model_platform, BoardModel, StubFirmware, MODEL_BOOT_LOG_LEN,
        MODEL_I2C_MAX_FREQ,
    };
    use alloc::vec;

    const NAME: &str = "conga-TC570";

    fn driver() -> (CgosDriver, Arc<BoardModel>, Arc<StubFirmware>) {
        let (platform, model, fw) = model_platform(BoardModel::standard(NAME));
        let mut drv = CgosDriver::new(DriverConfig::default());
        let handle = drv.register_entry(platform, Box::new(fw.clone()), 0).unwrap();
        assert_eq!(handle, 1);
        (drv, model, fw)
    }

    /// Requisição na board 1; devolve a resposta e a cauda de saída.
    fn call(
        drv: &CgosDriver,
        opcode: u32,
        unit: u32,
        pars: [u32; 4],
        tail: &[u8],
        out_tail: usize,
    ) -> (CgosReply, Vec<u8>) {
        let req = Request { opcode, handle: 1, unit, pars }.encode(tail);
        let mut out = vec![0u8; RESPONSE_HEADER_LEN + out_tail];
        let reply = drv.ioctl(CGOS_IOCTL, &req, &mut out);
        (reply, out[RESPONSE_HEADER_LEN..].to_vec())
    }

    #[test]
    fn test_storage_write_read_round_trip() {
        let (drv, model, _fw) = driver();

        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_WRITE, 0, [8, 4, 0, 0], &[1, 2, 3, 4], 0);
        assert!(reply.is_success());
        assert_eq!(&model.areas.lock()[0].bytes[8..12], &[1, 2, 3, 4]);

        let (reply, tail) = call(&drv, CGOS_STORAGE_AREA_READ, 0, [6, 8, 0, 0], &[], 8);
        assert!(reply.is_success());
        assert_eq!(reply.written, 8);
        assert_eq!(reply.origin, Origin::Firmware);
        assert_eq!(tail, [0, 0, 1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_storage_write_past_end_is_rejected_locally() {
        let (drv, model, fw) = driver();

        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_WRITE, 0, [62, 4, 0, 0], &[9; 4], 0);
        assert_eq!(reply.error(), Some(CgosError::InvalidParameter));
        assert_eq!(reply.origin, Origin::Local);
        assert_eq!(fw.calls_of(CGEB_STORAGE_AREA_WRITE), 0);
        assert!(model.areas.lock()[0].bytes.iter().all(|&b| b == 0));

        // Cauda menor que o tamanho declarado
        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_WRITE, 0, [0, 8, 0, 0], &[9; 4], 0);
        assert_eq!(reply.error(), Some(CgosError::InvalidParameter));
    }

    #[test]
    fn test_storage_read_needs_room_in_tail() {
        let (drv, _model, _fw) = driver();
        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_READ, 0, [0, 16, 0, 0], &[], 8);
        assert_eq!(reply.error(), Some(CgosError::InvalidParameter));
    }

    #[test]
    fn test_storage_units_by_class() {
        let (drv, _model, _fw) = driver();

        // Área reservada fica fora da contagem pública
        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_COUNT, 0, [0; 4], &[], 0);
        assert_eq!(reply.rets[0], 3);
        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_COUNT, STORAGE_EEPROM, [0; 4], &[], 0);
        assert_eq!(reply.rets[0], 2);

        // Segunda EEPROM é a área 3 (32 bytes)
        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_SIZE, STORAGE_EEPROM | 1, [0; 4], &[], 0);
        assert!(reply.is_success());
        assert_eq!(reply.rets[0], 32);
        assert_eq!(reply.origin, Origin::Local);

        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_SIZE, STORAGE_EEPROM | 2, [0; 4], &[], 0);
        assert_eq!(reply.error(), Some(CgosError::InvalidParameter));
    }

    #[test]
    fn test_storage_erase_fills_range() {
        let (drv, model, _fw) = driver();
        model.areas.lock()[1].bytes[..8].fill(0);

        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_ERASE, 1, [0, 4, 0, 0], &[], 0);
        assert!(reply.is_success());
        assert_eq!(&model.areas.lock()[1].bytes[..8], &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);

        let (reply, _) = call(&drv, CGOS_STORAGE_AREA_ERASE, 1, [255, 2, 0, 0], &[], 0);
        assert_eq!(reply.error(), Some(CgosError::InvalidParameter));
    }

    #[test]
    fn test_in_place_request_may_be_overwritten() {
        let (drv, model, _fw) = driver();

        let req = Request {
            opcode: CGOS_STORAGE_AREA_WRITE,
            handle: 1,
            unit: 0,
            pars: [0, 8, 0, 0],
        }
        .encode(&[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7]);
        let mut buf = req.clone();
        let reply = drv.ioctl_in_place(CGOS_IOCTL, &mut buf, req.len());

        assert!(reply.is_success());
        assert_eq!(&buf[..4], &0i32.to_le_bytes());
        assert_eq!(&model.areas.lock()[0].bytes[..8], &[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7]);

        // Tamanho declarado maior que o buffer
        let mut buf = req.clone();
        let reply = drv.ioctl_in_place(CGOS_IOCTL, &mut buf, req.len() + 1);
        assert_eq!(reply.error(), Some(CgosError::InvalidParameter));
    }

    #[test]
    fn test_board_info_embedded_length_is_clamped() {
        let (drv, _model, _fw) = driver();

        let (reply, tail) = call(&drv, CGOS_BOARD_GET_INFO, 0, [0; 4], &[], 16);
        assert!(reply.is_success());
        assert_eq!(reply.written, 16);
        assert_eq!(&tail[..4], &16u32.to_le_bytes());

        let full = drv.registry().get(1).unwrap().info().raw.len();
        let (reply, tail) = call(&drv, CGOS_BOARD_GET_INFO, 0, [0; 4], &[], full + 8);
        assert_eq!(reply.written, full);
        assert_eq!(&tail[..4], &(full as u32).to_le_bytes());
    }

    #[test]
    fn test_oversized_board_record_reports_copied_length() {
        let (platform, _model, fw) = model_platform(BoardModel::standard(NAME).with_info_size(256));
        let mut drv = CgosDriver::new(DriverConfig::default());
        drv.register_entry(platform, Box::new(fw), 0).unwrap();

        let (reply, tail) = call(&drv, CGOS_BOARD_GET_INFO, 0, [0; 4], &[], 300);
        assert!(reply.is_success());
        assert_eq!(reply.written, BOARD_INFO_SIZE);
        assert_eq!(&tail[..4], &(BOARD_INFO_SIZE as u32).to_le_bytes());
    }

    #[test]
    fn test_boot_error_log_count_is_clamped() {
        let (drv, _model, _fw) = driver();

        let (reply, tail) = call(&drv, CGOS_BOARD_GET_BOOT_ERROR_LOG, 0, [0; 4], &[], 16);
        assert!(reply.is_success());
        assert_eq!(reply.written, 16);
        assert_eq!(tail, (0..16u8).collect::<Vec<_>>());

        let (reply, _) = call(&drv, CGOS_BOARD_GET_BOOT_ERROR_LOG, 0, [0; 4], &[], 64);
        assert_eq!(reply.written, MODEL_BOOT_LOG_LEN);
        assert_eq!(reply.response_len(), RESPONSE_HEADER_LEN + MODEL_BOOT_LOG_LEN);
    }

    #[test]
    fn test_board_name_and_open_by_name() {
        let (drv, _model, _fw) = driver();

        let (reply, tail) = call(&drv, CGOS_BOARD_GET_NAME, 0, [0; 4], &[], 32);
        assert_eq!(reply.written, NAME.len() + 1);
        assert_eq!(&tail[..NAME.len()], NAME.as_bytes());
        assert_eq!(tail[NAME.len()], 0);

        let mut name = NAME.as_bytes().to_vec();
        name.push(0);
        let (reply, _) = call(&drv, CGOS_BOARD_OPEN_BY_NAME, 0, [0; 4], &name, 0);
        assert_eq!(reply.rets[0], 1);

        let (reply, _) = call(&drv, CGOS_BOARD_OPEN_BY_NAME, 0, [0; 4], b"conga-XX\0", 0);
        assert_eq!(reply.error(), Some(CgosError::NotFound));
    }

    #[test]
    fn test_watchdog_config_struct_echo() {
        let (drv, model, _fw) = driver();

        let (reply, tail) = call(&drv, CGOS_WDOG_GET_CONFIG_STRUCT, 0, [0; 4], &[0; 12], 12);
        assert!(reply.is_success());
        assert_eq!(reply.written, 12);
        assert_eq!(&tail[..4], &100u32.to_le_bytes());
        assert_eq!(&tail[8..], &300u32.to_le_bytes());

        let (reply, _) = call(&drv, CGOS_WDOG_DISABLE, 0, [0; 4], &[], 0);
        assert!(reply.is_success());
        assert_eq!(*model.wdog_config.lock(), vec![0; 4]);

        // Modelo tem um watchdog só
        let (reply, _) = call(&drv, CGOS_WDOG_TRIGGER, 1, [0; 4], &[], 0);
        assert_eq!(reply.error(), Some(CgosError::InvalidParameter));
        assert_eq!(reply.origin, Origin::Validation);
    }

    #[test]
    fn test_io_xor_and_xor() {
        let (drv, model, _fw) = driver();
        model.io.lock()[1] = 0x0A;

        let (reply, _) = call(&drv, CGOS_IO_XOR_AND_XOR, 1, [0xFF, 0x0F, 0x100, 0], &[], 0);
        assert!(reply.is_success());
        assert_eq!(reply.rets[0], 0x105);
        assert_eq!(model.io.lock()[1], 0x105);

        let (reply, _) = call(&drv, CGOS_IO_IS_AVAILABLE, 2, [0; 4], &[], 0);
        assert_eq!(reply.rets[0], 0);
    }

    #[test]
    fn test_i2c_units_by_type() {
        let (drv, _model, _fw) = driver();

        let (reply, _) = call(&drv, CGOS_I2C_COUNT, 0, [0; 4], &[], 0);
        assert_eq!(reply.rets[0], 4);
        let (reply, _) = call(&drv, CGOS_I2C_COUNT, crate::board::resolve::I2C_TYPE_PRIMARY, [0; 4], &[], 0);
        assert_eq!(reply.rets[0], 2);

        let (reply, _) = call(&drv, CGOS_I2C_GET_MAX_FREQUENCY, I2C_TYPE_SMB, [0; 4], &[], 0);
        assert!(reply.is_success());
        assert_eq!(reply.rets[0], MODEL_I2C_MAX_FREQ);

        let (reply, _) = call(&drv, CGOS_I2C_TYPE, 1, [0; 4], &[], 0);
        assert_eq!(reply.rets[0], I2C_TYPE_SMB);

        let (reply, _) = call(&drv, CGOS_I2C_IS_AVAILABLE, I2C_TYPE_SMB | 1, [0; 4], &[], 0);
        assert!(reply.is_success());
        assert_eq!(reply.rets[0], 0);
    }

    #[test]
    fn test_probe_registers_discovered_board() {
        let (platform, _model, _fw) = discoverable_platform(BoardModel::standard(NAME));
        let mut drv = CgosDriver::new(DriverConfig::default());
        assert_eq!(drv.probe(platform).unwrap(), 1);

        let (reply, _) = call(&drv, CGOS_CGEB_GET_VERSION, 0, [0; 4], &[], 0);
        assert_eq!(reply.rets[0], crate::testing::MODEL_CGEB_VERSION);

        let req = Request { opcode: CGOS_BOARD_COUNT, ..Request::default() }.encode(&[]);
        let mut out = [0u8; RESPONSE_HEADER_LEN];
        assert_eq!(drv.ioctl(CGOS_IOCTL, &req, &mut out).rets[0], 1);
    }

    #[test]
    fn test_full_registry_does_not_open_firmware() {
        let config = DriverConfig { max_boards: 1, ..DriverConfig::default() };
        let mut drv = CgosDriver::new(config);

        let (platform, _model, fw) = model_platform(BoardModel::standard(NAME));
        drv.register_entry(platform, Box::new(fw), 0).unwrap();

        let (platform, _model, fw) = model_platform(BoardModel::standard("conga-B7E3"));
        let err = drv.register_entry(platform, Box::new(fw.clone()), 0).unwrap_err();
        assert_eq!(err, CgosError::Error);
        assert_eq!(fw.calls_of(CGEB_OPEN), 0);
        assert_eq!(drv.registry().len(), 1);
    }
}
