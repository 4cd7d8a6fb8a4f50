//! Guest linear memory read/write helpers with bounds checking.
//!
//! Guest pointers arrive as `i32` and are reinterpreted as unsigned 32-bit
//! addresses. Every access is checked against the current memory size
//! before touching it.

use std::ops::Range;

use crate::error::SandboxError;

/// Resolve `[ptr, ptr+len)` to a byte range inside a memory of `mem_size` bytes.
pub fn checked_range(mem_size: usize, ptr: i32, len: usize) -> Result<Range<usize>, SandboxError> {
    let start = ptr as u32 as usize;
    let end = start.checked_add(len).ok_or_else(|| out_of_bounds(ptr, len, mem_size))?;
    if end > mem_size {
        return Err(out_of_bounds(ptr, len, mem_size));
    }
    Ok(start..end)
}

/// Read `len` bytes from guest memory at `ptr`.
pub fn read_bytes(mem: &[u8], ptr: i32, len: i32) -> Result<Vec<u8>, SandboxError> {
    let len = usize::try_from(len)
        .map_err(|_| SandboxError::MemoryError(format!("negative length {}", len)))?;
    let range = checked_range(mem.len(), ptr, len)?;
    Ok(mem[range].to_vec())
}

/// Write `data` to guest memory at `ptr`.
pub fn write_bytes(mem: &mut [u8], ptr: i32, data: &[u8]) -> Result<(), SandboxError> {
    let range = checked_range(mem.len(), ptr, data.len())?;
    mem[range].copy_from_slice(data);
    Ok(())
}

fn out_of_bounds(ptr: i32, len: usize, mem_size: usize) -> SandboxError {
    SandboxError::MemoryError(format!(
        "range at {:#x} (+{} bytes) outside linear memory of {} bytes",
        ptr as u32, len, mem_size
    ))
}
