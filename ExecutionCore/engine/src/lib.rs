//! `tally-engine`: the guest-side compute pipeline and buffer manager.
//!
//! Input bytes are sanitized to `0-9 , -`, parsed into signed integers,
//! reduced (summed by default), formatted, and wrapped in
//! `{"output": [<value>]}`.
//!
//! ## Architecture
//!
//! - [`sanitize`]: in-place character filter
//! - [`numbers::Numbers`]: cursor over the integers in a sanitized string
//! - [`reducer::Reducer`]: seam for the computation; [`reducer::Sum`] ships
//! - [`pipeline`]: sanitize → parse → reduce → envelope over a byte slice
//! - [`session::Session`]: input/output slots and the raw allocate /
//!   compute / release contract exported by the WASM guest

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod sanitize;
pub mod numbers;
pub mod reducer;
pub mod pipeline;
pub mod session;

// Re-export key types for convenience
pub use numbers::Numbers;
pub use pipeline::{run, run_with, Computation};
pub use reducer::{Reducer, Sum};
pub use session::{OutputSlot, Session};
