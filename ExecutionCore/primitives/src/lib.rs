//! `tally-primitives`: foundational types for the Tally guest and host.
//!
//! This crate provides the ABI status codes, the header-prefixed
//! [`GuestBuffer`] used for every buffer that crosses the linear-memory
//! boundary, NUL-terminated string helpers, and the JSON result envelope.
//!
//! Supports `#![no_std]` for WASM guest compatibility (use `default-features = false`).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod buffer;
pub mod cstr;
pub mod envelope;

// Re-export commonly used types at the crate root for convenience.
pub use error::{ErrorCode, TallyError, TallyResult};
pub use buffer::GuestBuffer;
pub use envelope::{encode_envelope, ENVELOPE_PREFIX, ENVELOPE_SUFFIX};
