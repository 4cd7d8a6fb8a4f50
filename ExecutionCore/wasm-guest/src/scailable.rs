//! The same ABI under the export names the Scailable runtime looks for.
//!
//! | Scailable      | Tally                 |
//! |----------------|-----------------------|
//! | `malloc_buffer`| `allocate`            |
//! | `pred`         | `compute`             |
//! | `get_out_loc`  | `get_output_location` |
//! | `get_out_len`  | `get_output_length`   |
//! | `free_buffer`  | `release`             |

use crate::exports;

#[no_mangle]
pub extern "C" fn malloc_buffer(length: i32) -> *mut u8 {
    exports::allocate(length)
}

#[no_mangle]
pub extern "C" fn pred() -> i32 {
    exports::compute()
}

#[no_mangle]
pub extern "C" fn get_out_loc() -> *const u8 {
    exports::get_output_location()
}

#[no_mangle]
pub extern "C" fn get_out_len() -> i32 {
    exports::get_output_length()
}

/// # Safety
/// Same contract as [`exports::release`].
#[no_mangle]
pub unsafe extern "C" fn free_buffer(ptr: *mut u8) {
    exports::release(ptr)
}
