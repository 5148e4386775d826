//! Watchdog.

use crate::cgeb::functions::CGEB_WDOG_SET_CONFIG;
use crate::cgeb::InvokeFlags;
use crate::ioctl::dispatch::Call;
use crate::ioctl::error::CgosResult;

pub fn op_wdog_count(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = call.board()?.wdog_count();
    Ok(())
}

pub fn op_wdog_is_available(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = (call.req.unit < call.board()?.wdog_count()) as u32;
    Ok(())
}

/// Configuração toda zerada desliga o watchdog.
pub fn op_wdog_disable(call: &mut Call<'_>) -> CgosResult<()> {
    let unit = call.unit;
    call.firmware()?
        .invoke_par(CGEB_WDOG_SET_CONFIG, unit, [0; 4], InvokeFlags::empty())?;
    Ok(())
}
