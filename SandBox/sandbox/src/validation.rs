//! WASM module validation: ABI compatibility checks.
//!
//! Validates that a compiled module can be driven through the compute ABI
//! before the sandbox accepts it. Checks:
//!
//! 1. `memory` export present
//! 2. Required function exports present with i32-only signatures
//! 3. Optional initialization export, if present, has the right signature
//! 4. No imports at all (the guest must be self-contained)

use wasmtime::{ExternType, Module, ValType};

use crate::config::AbiNames;
use crate::error::SandboxError;

/// Check if a ValType is i32.
fn is_i32(vt: &ValType) -> bool {
    matches!(vt, ValType::I32)
}

/// Expected function exports: (name, i32 param count, i32 result count).
fn required_exports(abi: &AbiNames) -> [(&'static str, usize, usize); 5] {
    [
        (abi.allocate, 1, 1),
        (abi.compute, 0, 1),
        (abi.output_length, 0, 1),
        (abi.output_location, 0, 1),
        (abi.release, 1, 0),
    ]
}

/// Validate that a module meets the compute ABI named by `abi`.
pub fn validate_module(module: &Module, abi: &AbiNames) -> Result<(), SandboxError> {
    validate_exports(module, abi)?;
    validate_imports(module)?;
    Ok(())
}

/// Check that all required exports are present with correct signatures.
fn validate_exports(module: &Module, abi: &AbiNames) -> Result<(), SandboxError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(SandboxError::ValidationError(
            "module must export 'memory'".into(),
        ));
    }

    for (name, params, results) in required_exports(abi) {
        check_function(module, name, params, results, true)?;
    }
    if let Some(name) = abi.initialize {
        check_function(module, name, 0, 1, false)?;
    }

    Ok(())
}

/// Check one function export. A missing optional export is accepted.
fn check_function(
    module: &Module,
    name: &str,
    expected_param_count: usize,
    expected_result_count: usize,
    required: bool,
) -> Result<(), SandboxError> {
    let Some(export) = module.exports().find(|e| e.name() == name) else {
        if required {
            return Err(SandboxError::ValidationError(format!(
                "missing required export: {}",
                name
            )));
        }
        return Ok(());
    };

    let func_ty = match export.ty() {
        ExternType::Func(ft) => ft,
        _ => {
            return Err(SandboxError::ValidationError(format!(
                "export '{}' must be a function",
                name
            )));
        }
    };

    let params: Vec<ValType> = func_ty.params().collect();
    let results: Vec<ValType> = func_ty.results().collect();

    if params.len() != expected_param_count || !params.iter().all(is_i32) {
        return Err(SandboxError::ValidationError(format!(
            "export '{}' has wrong param signature: expected {} i32 params, got {} params",
            name,
            expected_param_count,
            params.len()
        )));
    }

    if results.len() != expected_result_count || !results.iter().all(is_i32) {
        return Err(SandboxError::ValidationError(format!(
            "export '{}' has wrong result signature: expected {} i32 results, got {} results",
            name,
            expected_result_count,
            results.len()
        )));
    }

    Ok(())
}

/// Reject every import; the sandbox links no host functions and no WASI.
fn validate_imports(module: &Module) -> Result<(), SandboxError> {
    if let Some(import) = module.imports().next() {
        return Err(SandboxError::ValidationError(format!(
            "imports are not allowed: {}::{}",
            import.module(),
            import.name()
        )));
    }
    Ok(())
}
