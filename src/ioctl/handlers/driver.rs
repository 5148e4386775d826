//! # Driver
//!
//! Operações que não precisam de board: versão do driver, contagem e
//! abertura de boards.

use crate::cgeb::reply::ascii_field;
use crate::ioctl::dispatch::Call;
use crate::ioctl::error::{CgosError, CgosResult};

/// Versão do driver (major << 24 | minor << 16)
pub const DRIVER_VERSION: u32 = 0x0103_0000;
pub const DRIVER_BUILD: u32 = 1;
pub const DRIVER_NAME: &str = "cgeb";

pub fn op_get_drv_version(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = DRIVER_VERSION;
    Ok(())
}

/// rets = [build, boards registradas], cauda = nome do driver
pub fn op_get_drv_info(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets = [DRIVER_BUILD, call.registry.len() as u32];
    call.write_str(DRIVER_NAME);
    Ok(())
}

/// Boards da classe `unit` (0 = todas).
pub fn op_board_count(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = call.registry.count(call.req.unit) as u32;
    Ok(())
}

/// Handle da `pars[0]`-ésima board da classe `unit`.
pub fn op_board_open(call: &mut Call<'_>) -> CgosResult<()> {
    let handle = call
        .registry
        .nth(call.req.unit, call.req.pars[0] as usize)
        .ok_or(CgosError::NotFound)?;
    call.rets[0] = handle;
    Ok(())
}

pub fn op_board_open_by_name(call: &mut Call<'_>) -> CgosResult<()> {
    let name = ascii_field(call.input);
    if name.is_empty() {
        return Err(CgosError::InvalidParameter);
    }
    call.rets[0] = call.registry.find_by_name(name).ok_or(CgosError::NotFound)?;
    Ok(())
}
