//! The buffer manager behind the guest ABI.
//!
//! A `Session` tracks one input slot and one output slot. The host drives it
//! in a fixed order:
//!
//! 1. `allocate(len)` returns a pointer the host writes input bytes into
//! 2. `compute()` runs the pipeline and publishes a new output buffer
//! 3. `output_location()` / `output_length()` locate the result
//! 4. `release(ptr)` frees the input and output buffers
//!
//! Every pointer handed out is an owned [`GuestBuffer`] given away with
//! `into_raw`; the host must hand each one back to `release` exactly once.
//! `compute` does not free the previous output: the host owns it.

use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};

use tally_primitives::{cstr, GuestBuffer, TallyError, TallyResult};

use crate::pipeline;

/// Location and length of a published output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSlot {
    location: NonNull<u8>,
    length: usize,
}

impl OutputSlot {
    pub fn location(&self) -> *const u8 {
        self.location.as_ptr()
    }

    /// Byte length, excluding the NUL terminator.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// Input/output slot state for one module instance.
#[derive(Debug, Default)]
pub struct Session {
    input: Option<NonNull<u8>>,
    output: Option<OutputSlot>,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            input: None,
            output: None,
        }
    }

    /// Allocate a zeroed input buffer of `length` bytes and make it the
    /// current input.
    ///
    /// Returns null when the allocation cannot be satisfied, including for
    /// negative lengths; the input slot is cleared in that case. A buffer
    /// that was the input before stays owned by the host.
    pub fn allocate(&mut self, length: i32) -> *mut u8 {
        match self.allocate_input(length) {
            Ok(data) => data.as_ptr(),
            Err(_) => ptr::null_mut(),
        }
    }

    /// Fallible form of [`Session::allocate`].
    pub fn allocate_input(&mut self, length: i32) -> TallyResult<NonNull<u8>> {
        self.input = None;
        let capacity = usize::try_from(length).map_err(|_| TallyError::AllocationFailure {
            requested: length.unsigned_abs() as usize,
        })?;
        let data = GuestBuffer::allocate(capacity)?.into_raw();
        self.input = Some(data);
        Ok(data)
    }

    /// Current input location, or null.
    pub fn input_location(&self) -> *const u8 {
        self.input
            .map_or(ptr::null(), |data| data.as_ptr().cast_const())
    }

    /// Most recently published output location, or null.
    pub fn output_location(&self) -> *const u8 {
        self.output.map_or(ptr::null(), |slot| slot.location())
    }

    /// Most recently published output length, or 0.
    pub fn output_length(&self) -> usize {
        self.output.map_or(0, |slot| slot.length())
    }

    /// Run the pipeline over the current input and publish the envelope.
    ///
    /// On error the session state is left unchanged.
    pub fn compute(&mut self) -> TallyResult<OutputSlot> {
        let data = self.input.ok_or(TallyError::MissingInput)?;

        // SAFETY: the input slot only holds pointers produced by `allocate`,
        // and `release` clears it before the buffer is freed. ManuallyDrop
        // keeps ownership with the host.
        let mut input = ManuallyDrop::new(unsafe { GuestBuffer::from_raw(data) });
        let computation = pipeline::run(input.as_mut_slice())?;

        let location = computation.envelope.into_raw();
        // SAFETY: envelopes are always NUL-terminated.
        let length = unsafe { cstr::raw_string_length(location.as_ptr()) };

        let slot = OutputSlot { location, length };
        self.output = Some(slot);
        Ok(slot)
    }

    /// Free a buffer previously returned by this session. Null is ignored.
    ///
    /// If `ptr` is the tracked input or output, that slot is cleared.
    ///
    /// # Safety
    /// - `ptr` must be null or a pointer returned by `allocate` or published
    ///   by `compute` on a session in this process
    /// - it must not have been released already
    pub unsafe fn release(&mut self, ptr: *mut u8) {
        let Some(data) = NonNull::new(ptr) else {
            return;
        };
        if self.input == Some(data) {
            self.input = None;
        }
        if self.output.map(|slot| slot.location) == Some(data) {
            self.output = None;
        }
        drop(GuestBuffer::from_raw(data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::slice;

    fn write_input(session: &mut Session, input: &[u8]) -> *mut u8 {
        let ptr = session.allocate(input.len() as i32);
        assert!(!ptr.is_null());
        unsafe { ptr::copy_nonoverlapping(input.as_ptr(), ptr, input.len()) };
        ptr
    }

    fn read_output(session: &Session) -> &[u8] {
        unsafe { slice::from_raw_parts(session.output_location(), session.output_length()) }
    }

    #[test]
    fn test_fresh_session_has_no_output() {
        let session = Session::new();
        assert!(session.output_location().is_null());
        assert_eq!(session.output_length(), 0);
        assert!(session.input_location().is_null());
    }

    #[test]
    fn test_compute_without_allocate_is_missing_input() {
        let mut session = Session::new();
        assert_eq!(session.compute(), Err(TallyError::MissingInput));
        assert!(session.output_location().is_null());
    }

    #[test]
    fn test_full_call_sequence() {
        let mut session = Session::new();
        let input = write_input(&mut session, b"1,5,-3, 7");

        let slot = session.compute().unwrap();
        assert_eq!(read_output(&session), b"{\"output\": [10]}");
        assert_eq!(slot.length(), 16);
        assert_eq!(session.output_location(), slot.location());

        unsafe {
            session.release(slot.location() as *mut u8);
            session.release(input);
        }
        assert!(session.output_location().is_null());
        assert!(session.input_location().is_null());
    }

    #[test]
    fn test_zero_length_allocation_computes_zero() {
        let mut session = Session::new();
        let input = session.allocate(0);
        assert!(!input.is_null());

        session.compute().unwrap();
        assert_eq!(read_output(&session), b"{\"output\": [0]}");

        unsafe {
            session.release(session.output_location() as *mut u8);
            session.release(input);
        }
    }

    #[test]
    fn test_negative_length_returns_null() {
        let mut session = Session::new();
        assert!(session.allocate(-1).is_null());
        assert_eq!(session.compute(), Err(TallyError::MissingInput));
    }

    #[test]
    fn test_negative_length_reports_requested_size() {
        let mut session = Session::new();
        assert_eq!(
            session.allocate_input(-5),
            Err(TallyError::AllocationFailure { requested: 5 })
        );
        assert!(session.input_location().is_null());
    }

    #[test]
    fn test_failed_allocate_clears_previous_input() {
        let mut session = Session::new();
        let first = write_input(&mut session, b"4");
        assert!(session.allocate(-5).is_null());
        assert_eq!(session.compute(), Err(TallyError::MissingInput));
        unsafe { session.release(first) };
    }

    #[test]
    fn test_compute_is_idempotent() {
        let mut session = Session::new();
        let input = write_input(&mut session, b"a2,b3,c-1");

        let first = session.compute().unwrap();
        let first_text = unsafe { slice::from_raw_parts(first.location(), first.length()) }.to_vec();
        let second = session.compute().unwrap();

        // Each compute publishes a fresh buffer; both stay valid until released.
        assert_ne!(first.location(), second.location());
        assert_eq!(first_text, b"{\"output\": [4]}");
        assert_eq!(read_output(&session), first_text.as_slice());

        unsafe {
            session.release(first.location() as *mut u8);
            session.release(second.location() as *mut u8);
            session.release(input);
        }
    }

    #[test]
    fn test_compute_sanitizes_input_in_place() {
        let mut session = Session::new();
        let input = write_input(&mut session, b"1a,2b,3c");
        let slot = session.compute().unwrap();

        let sanitized = unsafe { slice::from_raw_parts(input, 8) };
        assert_eq!(&sanitized[..6], b"1,2,3\0");

        unsafe {
            session.release(slot.location() as *mut u8);
            session.release(input);
        }
    }

    #[test]
    fn test_compute_after_input_release_is_missing_input() {
        let mut session = Session::new();
        let input = write_input(&mut session, b"9");
        unsafe { session.release(input) };
        assert_eq!(session.compute(), Err(TallyError::MissingInput));
    }

    #[test]
    fn test_release_stale_output_keeps_current_slot() {
        let mut session = Session::new();
        let input = write_input(&mut session, b"2,2");
        let stale = session.compute().unwrap();
        let current = session.compute().unwrap();

        unsafe { session.release(stale.location() as *mut u8) };
        assert_eq!(session.output_location(), current.location());
        assert_eq!(read_output(&session), b"{\"output\": [4]}");

        unsafe {
            session.release(current.location() as *mut u8);
            session.release(input);
        }
    }

    #[test]
    fn test_release_null_is_ignored() {
        let mut session = Session::new();
        unsafe { session.release(ptr::null_mut()) };
        assert!(session.output_location().is_null());
    }

    #[test]
    fn test_input_without_terminator_stays_in_bounds() {
        let mut session = Session::new();
        // Host fills the whole buffer; no NUL byte follows the digits.
        let input = write_input(&mut session, b"12,30");
        let slot = session.compute().unwrap();
        assert_eq!(read_output(&session), b"{\"output\": [42]}");

        unsafe {
            session.release(slot.location() as *mut u8);
            session.release(input);
        }
    }
}
