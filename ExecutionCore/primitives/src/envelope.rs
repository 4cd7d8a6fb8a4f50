//! The fixed JSON envelope the guest reports its result in.
//!
//! The output is always `{"output": [<decimal>]}`. The decimal string holds
//! only digits and an optional leading hyphen, so no escaping is needed.

use crate::buffer::GuestBuffer;
use crate::cstr::{concat, format_decimal};
use crate::error::TallyResult;

/// Text before the decimal value.
pub const ENVELOPE_PREFIX: &[u8] = b"{\"output\": [";

/// Text after the decimal value.
pub const ENVELOPE_SUFFIX: &[u8] = b"]}";

/// Render `value` into a NUL-terminated envelope buffer.
///
/// The intermediate decimal string is freed before returning.
pub fn encode_envelope(value: i32) -> TallyResult<GuestBuffer> {
    let decimal = format_decimal(value)?;
    concat(&[ENVELOPE_PREFIX, decimal.c_str(), ENVELOPE_SUFFIX])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_envelope() {
        let out = encode_envelope(10).unwrap();
        assert_eq!(out.c_str(), b"{\"output\": [10]}");
    }

    #[test]
    fn test_encode_envelope_negative_and_zero() {
        assert_eq!(encode_envelope(0).unwrap().c_str(), b"{\"output\": [0]}");
        assert_eq!(encode_envelope(-42).unwrap().c_str(), b"{\"output\": [-42]}");
    }

    #[test]
    fn test_envelope_is_nul_terminated() {
        let out = encode_envelope(5).unwrap();
        let text_len = out.c_str().len();
        assert_eq!(out.capacity(), text_len + 1);
        assert_eq!(out.as_slice()[text_len], 0);
    }
}
