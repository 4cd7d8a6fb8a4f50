//! In-place input sanitization.
//!
//! Only digits, commas and hyphens survive. Everything else (spaces, JSON
//! punctuation, letters) is dropped, so `{"input": [1, 2]}` becomes `1,2`.

use tally_primitives::cstr::retain_allowed;

/// Bytes kept by [`sanitize`].
pub const ALLOWED_CHARACTERS: &[u8] = b"1234567890,-";

/// Compact `buf` to its allowed characters and return the retained length.
///
/// This is destructive. The retained string is NUL-terminated when the
/// buffer has room, and sanitizing it again changes nothing.
pub fn sanitize(buf: &mut [u8]) -> usize {
    retain_allowed(buf, ALLOWED_CHARACTERS)
}
