//! # CGEB - Congatec Embedded BIOS
//!
//! Protocolo de chamadas ao firmware embarcado no BIOS.
//!
//! ## Camadas
//!
//! | Módulo       | Responsabilidade                                  |
//! |--------------|---------------------------------------------------|
//! | `scan`       | Busca de assinaturas em janelas físicas           |
//! | `descriptor` | Descritores baixo/alto e relocação do código      |
//! | `fps`        | Registro de chamada e códigos de continuação      |
//! | `functions`  | Números das funções do firmware                   |
//! | `entry`      | Interface "invocar o firmware com o registro R"   |
//! | `engine`     | Loop de continuação                               |
//! | `marshal`    | Formas de chamada (escalares, buffers, estendida) |
//! | `reply`      | Registros devolvidos em `optr`                    |
//! | `context`    | Sessão: regiões, memory-map, handshake            |

pub mod context;
pub mod descriptor;
pub mod engine;
pub mod entry;
pub mod fps;
pub mod functions;
pub mod marshal;
pub mod region;
pub mod reply;
pub mod scan;

pub use context::FirmwareContext;
pub use engine::StepReport;
pub use entry::FirmwareEntry;
pub use marshal::{EnvelopeReply, InvokeFlags, OutputShape, ParReply};
pub use reply::{FwRecord, RecordKind};
