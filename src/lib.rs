#![cfg_attr(docsrs, feature(doc_cfg))]

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]
//! <br><br>
//!
//! ## You're probably looking for:
//! * [`LogContext`](LogContext)
//! * [`Logger`](Logger)
//! * [`LoggerConfig`](LoggerConfig)

pub mod prelude;
pub mod error;
pub mod format;
pub mod record;
pub(crate) mod levels;
pub(crate) mod sink;
pub(crate) mod sync;
mod facade;
mod macros;

pub use prelude::{
    Caller, Color, CompiledTemplate, LogContext, LogPanic, Logger, LoggerConfig, LoggerError,
    Record, Severity, Sink
};
