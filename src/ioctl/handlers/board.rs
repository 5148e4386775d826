//! Identificação da board, servida do cache do probe.

use crate::cgeb::marshal::clamp_embedded_length;
use crate::ioctl::dispatch::Call;
use crate::ioctl::error::CgosResult;

pub fn op_board_get_name(call: &mut Call<'_>) -> CgosResult<()> {
    let board = call.board()?;
    call.write_str(board.name());
    Ok(())
}

/// Registro de identificação completo. Se não couber, o tamanho embutido é
/// reescrito para o que foi copiado.
pub fn op_board_get_info(call: &mut Call<'_>) -> CgosResult<()> {
    let raw = &call.board()?.info().raw;
    call.write_tail(raw);
    call.written = clamp_embedded_length(call.output, raw.len());
    Ok(())
}

pub fn op_bios_version(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = call.board()?.bios_version();
    Ok(())
}

pub fn op_cgeb_version(call: &mut Call<'_>) -> CgosResult<()> {
    call.rets[0] = call.board()?.cgeb_version();
    Ok(())
}
