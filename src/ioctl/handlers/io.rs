//! GPIO.

use crate::cgeb::functions::{CGEB_IO_COUNT, CGEB_IO_READ, CGEB_IO_WRITE};
use crate::cgeb::InvokeFlags;
use crate::ioctl::dispatch::Call;
use crate::ioctl::error::CgosResult;

/// rets[0] = 1 se a unidade existe.
pub fn op_io_is_available(call: &mut Call<'_>) -> CgosResult<()> {
    let unit = call.req.unit;
    let count = call.firmware()?.invoke_plain(CGEB_IO_COUNT, InvokeFlags::RETS0)?;
    call.rets[0] = (unit < count) as u32;
    Ok(())
}

/// Leitura-modificação-escrita: `((v ^ p0) & p1) ^ p2`.
///
/// As duas chamadas rodam com o firmware travado.
pub fn op_io_xor_and_xor(call: &mut Call<'_>) -> CgosResult<()> {
    let (unit, [xor0, and, xor1, _]) = (call.unit, call.req.pars);
    let mut fw = call.firmware()?;

    let value = fw.invoke_unit(CGEB_IO_READ, unit, InvokeFlags::RETS0)?;
    let value = ((value ^ xor0) & and) ^ xor1;
    fw.invoke_par(CGEB_IO_WRITE, unit, [value, 0, 0, 0], InvokeFlags::empty())?;

    call.rets[0] = value;
    Ok(())
}
