//! # Storage Areas
//!
//! Informação vem do cache da board. Leitura, escrita e apagamento validam
//! `offset + len <= size` antes de chamar o firmware: nada é truncado em
//! silêncio.

use crate::board::resolve::{split_unit, storage_count};
use crate::cgeb::functions::{CGEB_STORAGE_AREA_ERASE, CGEB_STORAGE_AREA_READ, CGEB_STORAGE_AREA_WRITE};
use crate::cgeb::{InvokeFlags, OutputShape};
use crate::ioctl::dispatch::Call;
use crate::ioctl::error::{CgosError, CgosResult};

/// Áreas da classe `unit` (0 = todas as públicas).
pub fn op_storage_count(call: &mut Call<'_>) -> CgosResult<()> {
    let (class, _) = split_unit(call.req.unit);
    call.rets[0] = storage_count(call.board()?.storage_areas(), class) as u32;
    Ok(())
}

pub fn op_storage_type(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = call.area()?.kind;
    Ok(())
}

pub fn op_storage_size(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = call.area()?.size;
    Ok(())
}

pub fn op_storage_block_size(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = call.area()?.block_size;
    Ok(())
}

/// `(offset, len)` de `pars`, validados contra a área.
fn checked_range(call: &Call<'_>) -> CgosResult<(u32, usize)> {
    let [offset, len, ..] = call.req.pars;
    if !call.area()?.contains(offset, len) {
        crate::kdebug!("(Storage) Faixa fora da área offset=", offset);
        return Err(CgosError::InvalidParameter);
    }
    Ok((offset, len as usize))
}

/// pars = [offset, len]; cauda de saída recebe `len` bytes.
pub fn op_storage_read(call: &mut Call<'_>) -> CgosResult<()> {
    let (_, len) = checked_range(call)?;
    if len > call.output.len() {
        return Err(CgosError::InvalidParameter);
    }

    let (unit, pars) = (call.unit, call.req.pars);
    let mut fw = call.firmware()?;
    let reply = fw.invoke_envelope(
        CGEB_STORAGE_AREA_READ,
        unit,
        pars,
        &[],
        &mut call.output[..len],
        OutputShape::CountInPar(1),
    )?;
    call.rets = reply.rets;
    call.written = reply.written;
    Ok(())
}

/// pars = [offset, len]; cauda de entrada traz os `len` bytes.
pub fn op_storage_write(call: &mut Call<'_>) -> CgosResult<()> {
    let (_, len) = checked_range(call)?;
    if len > call.input.len() {
        return Err(CgosError::InvalidParameter);
    }

    let (unit, pars, input) = (call.unit, call.req.pars, call.input);
    let data = &input[..len];
    let reply = call.firmware()?.invoke_envelope(
        CGEB_STORAGE_AREA_WRITE,
        unit,
        pars,
        data,
        &mut [],
        OutputShape::Empty,
    )?;
    call.rets = reply.rets;
    Ok(())
}

/// pars = [offset, len]
pub fn op_storage_erase(call: &mut Call<'_>) -> CgosResult<()> {
    checked_range(call)?;
    let (unit, pars) = (call.unit, call.req.pars);
    let reply = call
        .firmware()?
        .invoke_par(CGEB_STORAGE_AREA_ERASE, unit, pars, InvokeFlags::empty())?;
    call.rets = reply.rets;
    Ok(())
}
