//! Core types shared by the callwatch producer and its clients: call detail
//! records, caller directory entries, multipart event metadata, and the
//! tracing bootstrap.

pub mod call;
pub mod multipart;
pub mod tracing;

pub use call::{CallField, CallFields, CallInfo, CallerInfo};
pub use multipart::{Multipart, MultipartStage, MSGID_MAX_LEN};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
