//! `tally-sandbox`: Wasmtime host for the Tally compute guest.
//!
//! This crate loads, validates, and drives a WASM module that speaks the
//! linear-memory compute ABI (`allocate`, `compute`, `get_output_location`,
//! `get_output_length`, `release`). It enforces:
//!
//! - **Determinism:** No SIMD, no threads, NaN canonicalization
//! - **Fuel metering:** Instruction-level metering to prevent infinite loops
//! - **Memory limits:** Bounded linear memory growth
//! - **No imports:** The guest must be self-contained, no WASI
//! - **ABI validation:** Required exports checked before execution
//!
//! The primary entry point is [`Sandbox::run`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod host_impl;
pub mod memory;
pub mod runtime;
pub mod validation;

pub use config::{AbiNames, SandboxConfig};
pub use envelope::{ComputeOutput, Envelope};
pub use error::SandboxError;
pub use runtime::{GuestInstance, Sandbox};
