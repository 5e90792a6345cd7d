//! Structured logging facility for Folio
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use folio_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Service operations own their boundary events (one start, one end or
//! end_error). Lower layers log decisions with plain `tracing` calls.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, Boundaries, CapturedEvent, TestCapture};
