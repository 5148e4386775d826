// =============================================================================
// DRIVER LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Sistema de logging do driver CGEB com custo ZERO em release.
//
// ARQUITETURA:
// - Usa features do Cargo para compile-time filtering
// - Com feature "no_logs", TODOS os macros viram expressões vazias
// - SEM core::fmt - Apenas strings e valores numéricos
// - SEM alocação
// - A saída vai para um `LogSink` registrado pelo ambiente hospedeiro
//   (serial do kernel, buffer de teste...). Sem sink, a saída é descartada.
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Falha de descoberta ou firmware incompatível
// - WARN:  Situações suspeitas mas recuperáveis
// - INFO:  Fluxo normal (probe, contagens)
// - DEBUG: Mensagens de debug do próprio firmware
// - TRACE: Cada passo do protocolo FPS
//
// COMO USAR:
//   kinfo!("(CGEB) Board aberta");               // Apenas string
//   kinfo!("(CGEB) Versão=", version);           // String + hex
//   kdebug!("(CGEB) Delay us=", dec us);         // String + decimal
//   kinfo!("(CGEB) fw: ", str texto);            // String + string
//   klog!("Fct=", fct, " Status=", status);      // Múltiplos valores
//
// =============================================================================

use spin::Once;

// =============================================================================
// SINK
// =============================================================================

/// Destino das linhas de log.
///
/// Implementado pelo ambiente que hospeda o driver (ex: serial do kernel).
pub trait LogSink: Sync {
    /// Escreve um fragmento de texto (sem newline implícito).
    fn write_str(&self, s: &str);
}

/// Sink global. Inicializado uma única vez via `set_sink`.
static SINK: Once<&'static dyn LogSink> = Once::new();

/// Registra o sink de log.
///
/// Só a primeira chamada tem efeito; chamadas posteriores são ignoradas e
/// retornam `false`.
pub fn set_sink(sink: &'static dyn LogSink) -> bool {
    let mut installed = false;
    SINK.call_once(|| {
        installed = true;
        sink
    });
    installed
}

/// Emite uma string para o sink (se houver).
#[inline]
pub fn emit_str(s: &str) {
    if let Some(sink) = SINK.get() {
        sink.write_str(s);
    }
}

/// Emite newline.
#[inline]
pub fn emit_nl() {
    emit_str("\n");
}

/// Emite u64 em hexadecimal.
///
/// Formato de saída: 0x0123456789ABCDEF (sempre 18 caracteres)
pub fn emit_hex(value: u64) {
    let mut buf = [0u8; 18];
    buf[0] = b'0';
    buf[1] = b'x';
    for i in 0..16 {
        let nibble = ((value >> ((15 - i) * 4)) & 0xF) as u8;
        buf[2 + i] = if nibble < 10 {
            b'0' + nibble
        } else {
            b'A' + nibble - 10
        };
    }
    // Só ASCII
    if let Ok(s) = core::str::from_utf8(&buf) {
        emit_str(s);
    }
}

/// Emite i64 em decimal.
pub fn emit_dec(value: i64) {
    let mut buf = [0u8; 20];
    let mut pos = buf.len();
    let negative = value < 0;
    let mut v = value.unsigned_abs();

    loop {
        pos -= 1;
        buf[pos] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    if negative {
        pos -= 1;
        buf[pos] = b'-';
    }
    if let Ok(s) = core::str::from_utf8(&buf[pos..]) {
        emit_str(s);
    }
}

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";

/// Corpo comum dos macros de nível.
#[doc(hidden)]
#[macro_export]
macro_rules! __klog_line {
    ($prefix:expr, $msg:expr) => {{
        $crate::core::logging::emit_str($prefix);
        $crate::core::logging::emit_str($msg);
        $crate::core::logging::emit_nl();
    }};
    ($prefix:expr, $msg:expr, str $val:expr) => {{
        $crate::core::logging::emit_str($prefix);
        $crate::core::logging::emit_str($msg);
        $crate::core::logging::emit_str($val);
        $crate::core::logging::emit_nl();
    }};
    ($prefix:expr, $msg:expr, dec $val:expr) => {{
        $crate::core::logging::emit_str($prefix);
        $crate::core::logging::emit_str($msg);
        $crate::core::logging::emit_dec($val as i64);
        $crate::core::logging::emit_nl();
    }};
    ($prefix:expr, $msg:expr, $val:expr) => {{
        $crate::core::logging::emit_str($prefix);
        $crate::core::logging::emit_str($msg);
        $crate::core::logging::emit_hex($val as u64);
        $crate::core::logging::emit_nl();
    }};
}

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {
        $crate::__klog_line!($crate::core::logging::P_ERROR, $($t)*)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {
        $crate::__klog_line!($crate::core::logging::P_WARN, $($t)*)
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL INFO
// =============================================================================
//
// kinfo! - Ativo com log_info, log_debug ou log_trace
//

#[cfg(any(feature = "log_info", feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {
        $crate::__klog_line!($crate::core::logging::P_INFO, $($t)*)
    };
}

#[cfg(not(any(feature = "log_info", feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================
//
// kdebug! - Ativo apenas com log_debug ou log_trace
//

#[cfg(any(feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {
        $crate::__klog_line!($crate::core::logging::P_DEBUG, $($t)*)
    };
}

#[cfg(not(any(feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================
//
// ktrace! - Ativo apenas com log_trace
//

#[cfg(feature = "log_trace")]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {
        $crate::__klog_line!($crate::core::logging::P_TRACE, $($t)*)
    };
}

#[cfg(not(feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS AUXILIARES
// =============================================================================

/// klog! - Log genérico sem prefixo de nível.
///
/// # Uso
/// ```rust
/// klog!("Addr=", addr);                    // String + hex
/// klog!("Start=", start, " End=", end);    // Múltiplos
/// ```
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! klog {
    ($msg:expr) => {{
        $crate::core::logging::emit_str($msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::core::logging::emit_str($msg);
        $crate::core::logging::emit_hex($val as u64);
    }};
    ($msg1:expr, $val:expr, $msg2:expr) => {{
        $crate::core::logging::emit_str($msg1);
        $crate::core::logging::emit_hex($val as u64);
        $crate::core::logging::emit_str($msg2);
    }};
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr) => {{
        $crate::core::logging::emit_str($msg1);
        $crate::core::logging::emit_hex($val1 as u64);
        $crate::core::logging::emit_str($msg2);
        $crate::core::logging::emit_hex($val2 as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{}};
}

/// knl! - Emite apenas newline.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! knl {
    () => {{
        $crate::core::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! knl {
    () => {{}};
}

// =============================================================================
// MACROS DE STATUS (OK/FAIL)
// =============================================================================

/// kok! - Log de sucesso (prefixo verde [OK]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {{
        $crate::core::logging::emit_str("\x1b[32m[OK]\x1b[0m ");
        $crate::core::logging::emit_str($msg);
        $crate::core::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

/// kfail! - Log de falha (prefixo vermelho [FAIL]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => {{
        $crate::core::logging::emit_str("\x1b[1;31m[FAIL]\x1b[0m ");
        $crate::core::logging::emit_str($msg);
        $crate::core::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_log, LogCapture, LOG};

    #[test]
    fn test_hex_and_dec_rendering() {
        capture_log();
        // Outros testes podem escrever no sink em paralelo; procuramos substrings.
        emit_hex(0xDEAD_BEEF);
        emit_nl();
        emit_dec(-1234);
        emit_nl();
        emit_dec(0);
        emit_nl();

        let out = LOG.text();
        assert!(out.contains("0x00000000DEADBEEF"));
        assert!(out.contains("-1234"));
        assert!(out.contains("0\n"));
    }

    #[test]
    fn test_second_sink_is_ignored() {
        static OTHER: LogCapture = LogCapture::new();
        capture_log();
        assert!(!set_sink(&OTHER));
    }
}
