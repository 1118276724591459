//! Structured logging for the menugraph engine
//!
//! One initialization entry point, [`init`], selects the output profile.
//! Operations announce themselves through the `log_op_start!`, `log_op_end!`
//! and `log_op_error!` macros so that every boundary carries the same
//! `component`/`op`/`event` triple (see `menugraph_core_types::schema`).
//!
//! ```rust
//! use menugraph_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Tests install an in-memory layer with [`init_test_capture`] and assert on
//! the recorded events.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, init_with_filter, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
