//! Sandbox runtime: Wasmtime engine, module loading, and the guest call sequence.
//!
//! `Sandbox` compiles and validates a module once. Each
//! [`Sandbox::instantiate`] creates a fresh Wasmtime store and instance, so
//! guest state never leaks between requests. [`GuestInstance`] exposes the
//! ABI step by step and as the full sequence in [`GuestInstance::submit`]:
//!
//! 1. `allocate(len + 1)` and write the input followed by a NUL byte
//! 2. `compute()` and check the status
//! 3. read `get_output_location()` / `get_output_length()` bytes
//! 4. `release` the output, then the input

use std::path::Path;

use tracing::{debug, trace, warn};
use wasmtime::{Config, Engine, Linker, Memory, Module, Store, Trap, TypedFunc};

use tally_primitives::ErrorCode;

use crate::config::SandboxConfig;
use crate::envelope::ComputeOutput;
use crate::error::SandboxError;
use crate::host_impl::HostState;
use crate::memory;
use crate::validation::validate_module;

/// The WASM compute sandbox.
///
/// Loads and validates a module, then runs requests by creating a fresh
/// Wasmtime instance for each one.
pub struct Sandbox {
    engine: Engine,
    module: Module,
    config: SandboxConfig,
}

impl Sandbox {
    /// Create a new sandbox from WASM bytecode (binary or text).
    ///
    /// Validates the module's exports and imports before accepting.
    pub fn new(wasm_bytes: &[u8], config: SandboxConfig) -> Result<Self, SandboxError> {
        let engine = create_engine()?;
        let module = Module::new(&engine, wasm_bytes)?;
        validate_module(&module, &config.abi)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    /// Load from a `.wasm` file path.
    pub fn from_file(path: &Path, config: SandboxConfig) -> Result<Self, SandboxError> {
        let engine = create_engine()?;
        let module = Module::from_file(&engine, path)?;
        validate_module(&module, &config.abi)?;
        debug!(path = %path.display(), "loaded guest module");
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Create a fresh guest instance with its own store, fuel, and limits.
    ///
    /// Calls the optional initialization export and fails if it returns
    /// non-zero.
    pub fn instantiate(&self) -> Result<GuestInstance, SandboxError> {
        let mut store = Store::new(&self.engine, HostState::new(&self.config));
        store.limiter(|state| &mut state.limits);
        store.set_fuel(self.config.fuel_limit)?;

        let linker = Linker::new(&self.engine);
        let instance = linker.instantiate(&mut store, &self.module)?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| SandboxError::MemoryError("no memory export".into()))?;

        let abi = &self.config.abi;
        let exports = GuestExports {
            allocate: instance.get_typed_func(&mut store, abi.allocate)?,
            compute: instance.get_typed_func(&mut store, abi.compute)?,
            output_length: instance.get_typed_func(&mut store, abi.output_length)?,
            output_location: instance.get_typed_func(&mut store, abi.output_location)?,
            release: instance.get_typed_func(&mut store, abi.release)?,
        };

        if let Some(name) = abi.initialize {
            if let Some(init) = instance.get_func(&mut store, name) {
                let init = init.typed::<(), i32>(&store)?;
                let code = handle_trap(init.call(&mut store, ()))?;
                if code != 0 {
                    return Err(SandboxError::InitFailed(code));
                }
            }
        }

        trace!(pages = memory.size(&store), "guest instance ready");
        Ok(GuestInstance {
            store,
            memory,
            exports,
            max_input_len: self.config.max_memory_bytes(),
        })
    }

    /// Run one request on a fresh instance.
    pub fn run(&self, input: &[u8]) -> Result<ComputeOutput, SandboxError> {
        self.instantiate()?.submit(input)
    }
}

struct GuestExports {
    allocate: TypedFunc<i32, i32>,
    compute: TypedFunc<(), i32>,
    output_length: TypedFunc<(), i32>,
    output_location: TypedFunc<(), i32>,
    release: TypedFunc<i32, ()>,
}

/// One live guest instance, driven through the compute ABI.
///
/// State persists across calls on the same instance, exactly as it would
/// inside a host runtime that keeps a module loaded.
pub struct GuestInstance {
    store: Store<HostState>,
    memory: Memory,
    exports: GuestExports,
    max_input_len: usize,
}

impl GuestInstance {
    /// Call the guest's `allocate`. A null result is an error.
    pub fn allocate(&mut self, len: usize) -> Result<i32, SandboxError> {
        let length = i32::try_from(len).map_err(|_| SandboxError::InputTooLarge {
            len,
            max: i32::MAX as usize,
        })?;
        let ptr = handle_trap(self.exports.allocate.call(&mut self.store, length))?;
        if ptr == 0 {
            return Err(SandboxError::AllocationFailed { requested: len });
        }
        trace!(ptr, len, "guest allocated buffer");
        Ok(ptr)
    }

    /// Copy `data` into guest memory at `ptr`.
    pub fn write(&mut self, ptr: i32, data: &[u8]) -> Result<(), SandboxError> {
        memory::write_bytes(self.memory.data_mut(&mut self.store), ptr, data)
    }

    /// Read `len` bytes of guest memory at `ptr`.
    pub fn read(&self, ptr: i32, len: i32) -> Result<Vec<u8>, SandboxError> {
        memory::read_bytes(self.memory.data(&self.store), ptr, len)
    }

    /// Call the guest's `compute` and map its status code.
    pub fn compute(&mut self) -> Result<(), SandboxError> {
        let code = handle_trap(self.exports.compute.call(&mut self.store, ()))?;
        match ErrorCode::from_i32(code) {
            Some(ErrorCode::Ok) => Ok(()),
            Some(ErrorCode::MissingInput) => Err(SandboxError::MissingInput),
            _ => Err(SandboxError::ComputeFailed(code)),
        }
    }

    pub fn output_location(&mut self) -> Result<i32, SandboxError> {
        handle_trap(self.exports.output_location.call(&mut self.store, ()))
    }

    pub fn output_length(&mut self) -> Result<i32, SandboxError> {
        handle_trap(self.exports.output_length.call(&mut self.store, ()))
    }

    /// Call the guest's `release` on a pointer it handed out.
    pub fn release(&mut self, ptr: i32) -> Result<(), SandboxError> {
        handle_trap(self.exports.release.call(&mut self.store, ptr))
    }

    /// Fuel left in this instance's store.
    pub fn fuel_remaining(&self) -> Result<u64, SandboxError> {
        Ok(self.store.get_fuel()?)
    }

    /// Run the full call sequence for one input and release every buffer.
    pub fn submit(&mut self, input: &[u8]) -> Result<ComputeOutput, SandboxError> {
        // Input is written as a C string, so the guest never needs to read
        // past the allocation to find its end.
        let needed = input.len() + 1;
        if needed > self.max_input_len {
            return Err(SandboxError::InputTooLarge {
                len: input.len(),
                max: self.max_input_len - 1,
            });
        }

        let mut terminated = Vec::with_capacity(needed);
        terminated.extend_from_slice(input);
        terminated.push(0);

        let in_ptr = self.allocate(needed)?;
        let result = self
            .write(in_ptr, &terminated)
            .and_then(|()| self.compute_and_collect());

        if let Err(err) = self.release(in_ptr) {
            warn!(%err, "failed to release input buffer");
            if result.is_ok() {
                return Err(err);
            }
        }

        let output = result?;
        debug!(
            input_len = input.len(),
            value = output.value(),
            "guest computed result"
        );
        Ok(output)
    }

    fn compute_and_collect(&mut self) -> Result<ComputeOutput, SandboxError> {
        self.compute()?;

        let out_ptr = self.output_location()?;
        let out_len = self.output_length()?;
        trace!(out_ptr, out_len, "guest published output");
        if out_ptr == 0 {
            return Err(SandboxError::ResponseError(
                "guest reported success but published no output".into(),
            ));
        }

        let raw = self.read(out_ptr, out_len)?;
        self.release(out_ptr)?;
        ComputeOutput::decode(raw)
    }
}

/// Create a Wasmtime engine with fuel metering and a deterministic
/// feature set.
fn create_engine() -> Result<Engine, SandboxError> {
    let mut wasm_config = Config::new();

    // Fuel metering bounds runaway guests
    wasm_config.consume_fuel(true);

    // Determinism enforcement
    wasm_config.wasm_threads(false);
    wasm_config.wasm_simd(false);
    wasm_config.wasm_relaxed_simd(false);
    wasm_config.wasm_multi_memory(false);
    wasm_config.cranelift_nan_canonicalization(true);

    Ok(Engine::new(&wasm_config)?)
}

/// Handle a guest function call result, converting traps to SandboxError.
///
/// Fuel exhaustion → `SandboxError::FuelExhausted`
/// Other traps → `SandboxError::GuestTrapped`
fn handle_trap<R>(result: Result<R, anyhow::Error>) -> Result<R, SandboxError> {
    result.map_err(|e| match e.downcast_ref::<Trap>() {
        Some(Trap::OutOfFuel) => SandboxError::FuelExhausted,
        _ => SandboxError::GuestTrapped(format!("{:#}", e)),
    })
}
