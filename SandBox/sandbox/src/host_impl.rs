//! Per-instance state held in the Wasmtime `Store`.
//!
//! The guest imports nothing, so the only host-side state is the resource
//! limiter that bounds linear-memory growth.

use wasmtime::{StoreLimits, StoreLimitsBuilder};

use crate::config::SandboxConfig;

/// Per-instance mutable state held in the Wasmtime `Store`.
///
/// Created fresh for each guest instance and dropped with it.
pub struct HostState {
    /// Memory/instance caps enforced through `Store::limiter`.
    pub limits: StoreLimits,
}

impl HostState {
    pub fn new(config: &SandboxConfig) -> Self {
        let limits = StoreLimitsBuilder::new()
            .memory_size(config.max_memory_bytes())
            .memories(1)
            .instances(1)
            .build();
        Self { limits }
    }
}
