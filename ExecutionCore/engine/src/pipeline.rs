//! The marshalling pipeline: sanitize, parse, reduce, format, wrap.
//!
//! [`run`] works on a caller-owned byte slice and returns a fresh envelope
//! buffer. It does not know about sessions or raw pointers; see
//! [`crate::session`] for the buffer manager built on top of it.

use tally_primitives::{encode_envelope, GuestBuffer, TallyResult};

use crate::numbers::Numbers;
use crate::reducer::{Reducer, Sum};
use crate::sanitize::sanitize;

/// Result of one pipeline run.
#[derive(Debug)]
pub struct Computation {
    /// Length of the input after sanitization.
    pub sanitized_len: usize,
    /// The reduced value.
    pub value: i32,
    /// NUL-terminated `{"output": [<value>]}`.
    pub envelope: GuestBuffer,
}

/// Run the pipeline with the default [`Sum`] reducer.
///
/// `input` is sanitized in place.
pub fn run(input: &mut [u8]) -> TallyResult<Computation> {
    run_with(input, &Sum)
}

/// Run the pipeline with a caller-chosen reducer.
pub fn run_with<R: Reducer + ?Sized>(input: &mut [u8], reducer: &R) -> TallyResult<Computation> {
    let sanitized_len = sanitize(input);
    let value = reducer.reduce(Numbers::new(&input[..sanitized_len]));
    let envelope = encode_envelope(value)?;
    Ok(Computation {
        sanitized_len,
        value,
        envelope,
    })
}
