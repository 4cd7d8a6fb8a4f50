//! `tally-wasm-guest`: WASM cdylib exposing the Tally linear-memory ABI.
//!
//! Build with `cargo build --release --target wasm32-unknown-unknown -p tally-wasm-guest`.
//! The artifact exports:
//!
//! - `initialize`: readiness handshake, returns 0
//! - `allocate`: reserve an input buffer the host writes into
//! - `compute`: sanitize, sum, and publish `{"output": [<sum>]}`
//! - `get_output_location` / `get_output_length`: locate the result
//! - `release`: free a buffer previously handed to the host
//!
//! With the `scailable-abi` feature the same operations are also exported as
//! `malloc_buffer`, `pred`, `get_out_loc`, `get_out_len` and `free_buffer`.
//!
//! The module has no imports: no WASI, no host functions.
//!
//! The crate's own code uses only `core` and `alloc`. `std` is linked solely
//! for the `wasm32-unknown-unknown` allocator and panic handler: the engine
//! and primitives are built without their `std` feature, so nothing else in
//! the dependency graph provides them.

#![no_std]

extern crate alloc;
extern crate std;

mod exports;
#[cfg(feature = "scailable-abi")]
mod scailable;

// Re-export the exported functions so the linker sees them.
// They are already #[no_mangle] pub extern "C" in exports.rs.
pub use exports::{allocate, compute, get_output_length, get_output_location, initialize, release};
#[cfg(feature = "scailable-abi")]
pub use scailable::{free_buffer, get_out_len, get_out_loc, malloc_buffer, pred};
