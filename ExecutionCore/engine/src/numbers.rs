//! Cursor over the signed decimal integers in a sanitized string.
//!
//! Parsing stops silently at the first position where no digit can be read
//! (end of input, a bare hyphen, two hyphens in a row). Every yielded number
//! consumes at least one digit, so the cursor cannot stall.

use core::iter::FusedIterator;

use tally_primitives::cstr::string_length;

/// Bytes skipped after each number.
pub const SEPARATORS: &[u8] = b", ";

/// Iterator over the integers at the front of a byte string.
#[derive(Debug, Clone)]
pub struct Numbers<'a> {
    rest: &'a [u8],
}

impl<'a> Numbers<'a> {
    /// Start a cursor over `input`, read up to its first NUL.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            rest: &input[..string_length(input)],
        }
    }

    /// The unparsed tail. Non-empty after iteration ends only when the
    /// input held a token that is not a number.
    pub fn remainder(&self) -> &'a [u8] {
        self.rest
    }
}

impl Iterator for Numbers<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let (value, consumed) = parse_leading_int(self.rest)?;
        debug_assert!(consumed > 0, "number cursor must advance");

        let rest = &self.rest[consumed..];
        let skip = rest.iter().take_while(|b| SEPARATORS.contains(b)).count();
        self.rest = &rest[skip..];
        Some(value)
    }
}

impl FusedIterator for Numbers<'_> {}

/// Parse an optionally hyphen-prefixed decimal integer at the start of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if no digit
/// follows the optional sign. Values outside the `i32` range saturate.
pub fn parse_leading_int(bytes: &[u8]) -> Option<(i32, usize)> {
    let negative = bytes.first() == Some(&b'-');
    let start = usize::from(negative);
    let digits = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }

    // Cap at 2^31 so the magnitude never overflows and i32::MIN stays exact.
    let cap = i64::from(i32::MAX) + 1;
    let magnitude = bytes[start..start + digits]
        .iter()
        .fold(0i64, |acc, &b| (acc * 10 + i64::from(b - b'0')).min(cap));

    let value = if negative {
        (-magnitude).max(i64::from(i32::MIN))
    } else {
        magnitude.min(i64::from(i32::MAX))
    };
    Some((value as i32, start + digits))
}
