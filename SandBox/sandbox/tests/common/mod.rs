//! Shared test helpers for integration tests.
//!
//! Provides the real guest artifact loader and a small hand-written WAT guest
//! whose behaviour each test can bend through string substitution.

#![allow(dead_code)]

use tally_sandbox::{Sandbox, SandboxConfig};

/// WASM artifact path (relative to sandbox crate manifest dir).
const WASM_ARTIFACT: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../target/wasm32-unknown-unknown/release/tally_wasm_guest.wasm"
);

// ── Sandbox Loaders ──

/// Build command for the artifact the end-to-end tests load.
pub const BUILD_GUEST: &str =
    "cargo build --release --target wasm32-unknown-unknown -p tally-wasm-guest";

/// Load the real WASM artifact into a Sandbox with default config.
pub fn load_sandbox() -> Sandbox {
    load_sandbox_with_config(SandboxConfig::default())
}

/// Load the real WASM artifact with a custom SandboxConfig.
pub fn load_sandbox_with_config(config: SandboxConfig) -> Sandbox {
    load_sandbox_from(std::path::Path::new(WASM_ARTIFACT), config)
}

/// Load a guest artifact, failing loudly when it has not been built.
pub fn load_sandbox_from(path: &std::path::Path, config: SandboxConfig) -> Sandbox {
    assert!(
        path.exists(),
        "WASM artifact not found at {:?}. Build with: {}",
        path,
        BUILD_GUEST
    );
    Sandbox::from_file(path, config).expect("failed to load sandbox")
}

// ── Stub Guest ──

/// Minimal guest speaking the compute ABI.
///
/// `allocate` bumps a pointer starting at 1024 and records it as the input.
/// `compute` returns 1 until something was allocated, then publishes the
/// fixed envelope stored at address 16.
pub const STUB_GUEST: &str = r#"
    (module
        (memory (export "memory") 1)
        (global $next (mut i32) (i32.const 1024))
        (global $input (mut i32) (i32.const 0))
        (global $out (mut i32) (i32.const 0))
        (data (i32.const 16) "{\"output\": [3]}")

        (func (export "initialize") (result i32) i32.const 0)

        (func (export "allocate") (param $len i32) (result i32)
            (local $ptr i32)
            global.get $next
            local.set $ptr
            global.get $next
            local.get $len
            i32.add
            global.set $next
            local.get $ptr
            global.set $input
            local.get $ptr)

        (func (export "compute") (result i32)
            global.get $input
            i32.eqz
            if (result i32)
                i32.const 1
            else
                i32.const 16
                global.set $out
                i32.const 0
            end)

        (func (export "get_output_length") (result i32) i32.const 15)
        (func (export "get_output_location") (result i32) global.get $out)

        (func (export "release") (param $ptr i32)
            local.get $ptr
            global.get $input
            i32.eq
            if
                i32.const 0
                global.set $input
            end)
    )
"#;

/// The stub guest with `from` replaced by `to`.
pub fn stub_with(from: &str, to: &str) -> String {
    assert!(STUB_GUEST.contains(from), "stub does not contain {:?}", from);
    STUB_GUEST.replace(from, to)
}

/// Build a sandbox around WAT text with the given config.
pub fn wat_sandbox(wat: &str, config: SandboxConfig) -> Sandbox {
    Sandbox::new(wat.as_bytes(), config).expect("stub guest should validate")
}
