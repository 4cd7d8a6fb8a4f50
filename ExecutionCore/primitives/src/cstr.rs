//! NUL-terminated byte string helpers.
//!
//! The guest speaks C strings at its boundary: inputs are read up to the
//! first NUL and every buffer it produces carries a trailing NUL that is not
//! part of the reported length.

use crate::buffer::GuestBuffer;
use crate::error::TallyResult;

/// Length of the string in `bytes`: up to the first NUL, or the whole slice.
pub fn string_length(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}

/// Length of the NUL-terminated string at `ptr`. A null pointer has length 0.
///
/// # Safety
/// A non-null `ptr` must point to readable memory containing a NUL byte.
pub unsafe fn raw_string_length(ptr: *const u8) -> usize {
    if ptr.is_null() {
        return 0;
    }
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    len
}

/// Concatenate `parts` into one freshly allocated NUL-terminated buffer.
///
/// Each part is read up to its first NUL. The result's capacity is exactly
/// the sum of the part lengths plus one terminator byte.
pub fn concat(parts: &[&[u8]]) -> TallyResult<GuestBuffer> {
    let total: usize = parts.iter().map(|p| string_length(p)).sum();
    let mut out = GuestBuffer::allocate(total + 1)?;

    let dst = out.as_mut_slice();
    let mut pos = 0;
    for part in parts {
        let len = string_length(part);
        dst[pos..pos + len].copy_from_slice(&part[..len]);
        pos += len;
    }
    dst[pos] = 0;
    Ok(out)
}

/// Number of decimal digits in `n` (at least one).
pub fn decimal_len(mut n: u32) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

/// Format `value` as a NUL-terminated decimal string.
///
/// Allocates exactly sign + digits + terminator bytes.
pub fn format_decimal(value: i32) -> TallyResult<GuestBuffer> {
    let negative = value < 0;
    let mut n = value.unsigned_abs();
    let len = decimal_len(n) + usize::from(negative) + 1;

    let mut out = GuestBuffer::allocate(len)?;
    let s = out.as_mut_slice();

    // Terminator is already in place: the buffer is zeroed.
    let mut pos = len - 1;
    loop {
        pos -= 1;
        s[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    if negative {
        s[0] = b'-';
    }
    Ok(out)
}

/// Compact the string in `buf` in place, keeping only bytes in `allowed`.
///
/// Relative order is preserved. The result is NUL-terminated when there is
/// room after it. Returns the retained length.
pub fn retain_allowed(buf: &mut [u8], allowed: &[u8]) -> usize {
    let end = string_length(buf);
    let mut kept = 0;
    for i in 0..end {
        let b = buf[i];
        if allowed.contains(&b) {
            buf[kept] = b;
            kept += 1;
        }
    }
    if kept < buf.len() {
        buf[kept] = 0;
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_length() {
        assert_eq!(string_length(b"abc\0def"), 3);
        assert_eq!(string_length(b"abc"), 3);
        assert_eq!(string_length(b""), 0);
        assert_eq!(string_length(b"\0"), 0);
    }

    #[test]
    fn test_raw_string_length_null_is_zero() {
        assert_eq!(unsafe { raw_string_length(core::ptr::null()) }, 0);
    }

    #[test]
    fn test_raw_string_length() {
        let s = b"tally\0";
        assert_eq!(unsafe { raw_string_length(s.as_ptr()) }, 5);
    }

    #[test]
    fn test_concat_exact_capacity() {
        let out = concat(&[b"{\"a\": [", b"42", b"]}"]).unwrap();
        assert_eq!(out.c_str(), b"{\"a\": [42]}");
        assert_eq!(out.capacity(), 11 + 1);
        assert_eq!(out.as_slice()[11], 0);
    }

    #[test]
    fn test_concat_respects_embedded_terminators() {
        let out = concat(&[b"ab\0zz", b"cd"]).unwrap();
        assert_eq!(out.c_str(), b"abcd");
        assert_eq!(out.capacity(), 5);
    }

    #[test]
    fn test_concat_nothing() {
        let out = concat(&[]).unwrap();
        assert_eq!(out.c_str(), b"");
        assert_eq!(out.capacity(), 1);
    }

    #[test]
    fn test_decimal_len() {
        assert_eq!(decimal_len(0), 1);
        assert_eq!(decimal_len(9), 1);
        assert_eq!(decimal_len(10), 2);
        assert_eq!(decimal_len(u32::MAX), 10);
    }

    #[test]
    fn test_format_decimal() {
        let cases: &[(i32, &[u8])] = &[
            (0, b"0"),
            (7, b"7"),
            (10, b"10"),
            (-3, b"-3"),
            (2_147_483_647, b"2147483647"),
            (-2_147_483_648, b"-2147483648"),
        ];
        for (value, expected) in cases {
            let out = format_decimal(*value).unwrap();
            assert_eq!(out.c_str(), *expected, "formatting {}", value);
            assert_eq!(out.capacity(), expected.len() + 1);
        }
    }

    #[test]
    fn test_retain_allowed_compacts_in_place() {
        let mut buf = *b"1a,2b,3c\0";
        let kept = retain_allowed(&mut buf, b"1234567890,-");
        assert_eq!(kept, 5);
        assert_eq!(&buf[..6], b"1,2,3\0");
    }

    #[test]
    fn test_retain_allowed_full_buffer_without_room_for_terminator() {
        let mut buf = *b"123";
        let kept = retain_allowed(&mut buf, b"0123456789");
        assert_eq!(kept, 3);
        assert_eq!(&buf, b"123");
    }

    #[test]
    fn test_retain_allowed_is_idempotent() {
        let mut buf = *b"{\"input\": [4, -2]}\0";
        let first = retain_allowed(&mut buf, b"1234567890,-");
        let snapshot = buf;
        let second = retain_allowed(&mut buf, b"1234567890,-");
        assert_eq!(first, second);
        assert_eq!(buf, snapshot);
        assert_eq!(&buf[..first], b"4,-2");
    }
}
