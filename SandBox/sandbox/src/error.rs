//! Sandbox error types.

/// Top-level error type for the sandbox crate.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Wasmtime engine, compilation, or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing exports, bad imports, etc.).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Guest returned non-zero from its initialization export.
    #[error("guest initialization failed with code {0}")]
    InitFailed(i32),

    /// Guest `allocate` returned a null pointer.
    #[error("guest could not allocate {requested} bytes")]
    AllocationFailed { requested: usize },

    /// Guest `compute` ran without a live input buffer.
    #[error("guest has no input buffer (ERR_MISSING_INPUT)")]
    MissingInput,

    /// Guest `compute` returned any other non-zero status.
    #[error("guest compute failed with code {0}")]
    ComputeFailed(i32),

    /// Input does not fit the configured linear-memory limit.
    #[error("input of {len} bytes exceeds the {max} byte limit")]
    InputTooLarge { len: usize, max: usize },

    /// Memory operation failed (out-of-bounds access).
    #[error("memory error: {0}")]
    MemoryError(String),

    /// Output bytes are not a valid result envelope.
    #[error("response error: {0}")]
    ResponseError(String),

    /// Fuel exhausted during execution.
    #[error("fuel exhausted (instruction limit)")]
    FuelExhausted,

    /// WASM guest trapped.
    #[error("guest trapped: {0}")]
    GuestTrapped(String),
}

impl From<serde_json::Error> for SandboxError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseError(err.to_string())
    }
}
