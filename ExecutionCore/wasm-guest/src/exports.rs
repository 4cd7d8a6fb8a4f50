//! Guest exported functions.
//!
//! The host calls these in a fixed order:
//! `allocate` → write input → `compute` → `get_output_location` /
//! `get_output_length` → read output → `release` (input and output).
//!
//! `compute` returns an `i32` status (0 = OK). Pointers are returned as
//! plain addresses into linear memory; null signals allocation failure.
//! They must never panic; panics in WASM cause traps.

use core::cell::UnsafeCell;

use tally_engine::Session;
use tally_primitives::ErrorCode;

/// The one session behind the exported ABI.
struct SessionCell(UnsafeCell<Session>);

// SAFETY: a WASM instance has a single thread of control and the host
// sequences every call. Native callers must serialize calls themselves.
unsafe impl Sync for SessionCell {}

static SESSION: SessionCell = SessionCell(UnsafeCell::new(Session::new()));

fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> R {
    // SAFETY: see `SessionCell`; exports never call one another, so the
    // mutable borrow is unique for the duration of `f`.
    f(unsafe { &mut *SESSION.0.get() })
}

/// Module initialization. Nothing to set up; returns 0 to signal readiness.
#[no_mangle]
pub extern "C" fn initialize() -> i32 {
    ErrorCode::Ok.as_i32()
}

/// Allocate `length` zeroed bytes for the host to write input into.
///
/// The buffer becomes the current input. Returns null on failure,
/// including for negative lengths.
#[no_mangle]
pub extern "C" fn allocate(length: i32) -> *mut u8 {
    with_session(|session| session.allocate(length))
}

/// Sanitize and sum the current input, then publish the envelope.
///
/// # Returns
/// 0 on success, 1 if no input buffer is live, 2 if an output allocation
/// failed. On success the host reads the result via `get_output_location`
/// and `get_output_length` and must `release` it.
#[no_mangle]
pub extern "C" fn compute() -> i32 {
    match with_session(Session::compute) {
        Ok(_) => ErrorCode::Ok.as_i32(),
        Err(err) => err.code().as_i32(),
    }
}

/// Length of the most recent output, excluding its NUL terminator; 0 if none.
#[no_mangle]
pub extern "C" fn get_output_length() -> i32 {
    with_session(|session| session.output_length()) as i32
}

/// Location of the most recent output; null if none.
#[no_mangle]
pub extern "C" fn get_output_location() -> *const u8 {
    with_session(|session| session.output_location())
}

/// Free a buffer previously returned by `allocate` or published by `compute`.
///
/// # Safety
/// - `ptr` must be null or a pointer this module handed out
/// - must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn release(ptr: *mut u8) {
    with_session(|session| session.release(ptr))
}
