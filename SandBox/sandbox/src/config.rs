//! Sandbox configuration.

/// Size of one WASM linear-memory page.
pub const WASM_PAGE_SIZE: usize = 65_536;

/// Default linear-memory cap: 256 pages = 16 MiB.
pub const DEFAULT_MAX_MEMORY_PAGES: u32 = 256;

/// Default Wasmtime fuel per guest instance.
pub const DEFAULT_FUEL_LIMIT: u64 = 100_000_000;

/// Export names the sandbox looks up on the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiNames {
    pub allocate: &'static str,
    pub compute: &'static str,
    pub output_length: &'static str,
    pub output_location: &'static str,
    pub release: &'static str,
    /// Optional readiness export, called once after instantiation.
    pub initialize: Option<&'static str>,
}

impl AbiNames {
    /// Names exported by `tally-wasm-guest`.
    pub const TALLY: Self = Self {
        allocate: "allocate",
        compute: "compute",
        output_length: "get_output_length",
        output_location: "get_output_location",
        release: "release",
        initialize: Some("initialize"),
    };

    /// Names the Scailable runtime looks for.
    pub const SCAILABLE: Self = Self {
        allocate: "malloc_buffer",
        compute: "pred",
        output_length: "get_out_len",
        output_location: "get_out_loc",
        release: "free_buffer",
        initialize: None,
    };
}

impl Default for AbiNames {
    fn default() -> Self {
        Self::TALLY
    }
}

/// Configuration for the WASM sandbox.
///
/// Controls memory limits, instruction fuel, and which export names to drive.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Maximum linear memory pages (1 page = 64 KiB).
    /// Default: 256 pages = 16 MiB.
    pub max_memory_pages: u32,

    /// Wasmtime fuel limit per instance (instruction metering).
    /// Prevents runaway guest loops.
    pub fuel_limit: u64,

    /// Export names of the guest ABI.
    pub abi: AbiNames,
}

impl SandboxConfig {
    /// Maximum linear memory in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_pages as usize * WASM_PAGE_SIZE
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: DEFAULT_MAX_MEMORY_PAGES,
            fuel_limit: DEFAULT_FUEL_LIMIT,
            abi: AbiNames::TALLY,
        }
    }
}
