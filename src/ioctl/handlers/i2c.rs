//! # I2C
//!
//! Tipo e frequência máxima vêm do registro `I2cGetInfo`, consultado a cada
//! pedido.

use crate::board::resolve;
use crate::cgeb::functions::CGEB_I2C_GET_INFO;
use crate::cgeb::{FwRecord, RecordKind};
use crate::ioctl::dispatch::Call;
use crate::ioctl::error::{CgosError, CgosResult};

/// Barramentos da classe `unit` (0 = todos).
pub fn op_i2c_count(call: &mut Call<'_>) -> CgosResult<()> {
    let buses = call.board()?.i2c_count();
    let (class, _) = resolve::split_unit(call.req.unit);
    call.rets[0] = if class == 0 {
        buses
    } else {
        resolve::i2c_count(&mut *call.firmware()?, buses, class)?
    };
    Ok(())
}

pub fn op_i2c_type(call: &mut Call<'_>) -> CgosResult<()> {
    let bus = call.unit;
    call.rets[0] = resolve::i2c_type(&mut *call.firmware()?, bus)?;
    Ok(())
}

/// rets[0] = 1 se a unidade existe. Unidade ausente não é erro.
pub fn op_i2c_is_available(call: &mut Call<'_>) -> CgosResult<()> {
    let buses = call.board()?.i2c_count();
    let unit = call.req.unit;
    let (class, _) = resolve::split_unit(unit);
    let found = if class == 0 {
        resolve::i2c_index(buses, unit)
    } else {
        resolve::i2c(&mut *call.firmware()?, buses, unit)?
    };
    call.rets[0] = found.is_some() as u32;
    Ok(())
}

pub fn op_i2c_get_max_frequency(call: &mut Call<'_>) -> CgosResult<()> {
    let bus = call.unit;
    let FwRecord::I2cInfo(info) = call
        .firmware()?
        .invoke_record(CGEB_I2C_GET_INFO, bus, RecordKind::I2cInfo)?
    else {
        return Err(CgosError::Error);
    };
    call.rets[0] = info.max_frequency;
    Ok(())
}
