//! Error types shared by the Tally guest and host.
//!
//! `compute` reports its outcome as an `i32`. The values follow the C
//! `EXIT_SUCCESS` / `EXIT_FAILURE` pair the host runtime expects, with
//! one extra code for allocation failure.

use core::fmt;

/// Status codes returned across the guest ABI.
///
/// These repr values are part of the wire contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    MissingInput = 1,
    AllocationFailure = 2,
}

impl ErrorCode {
    /// Convert from an i32 status returned by a guest export.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::MissingInput),
            2 => Some(Self::AllocationFailure),
            _ => None,
        }
    }

    /// Return the i32 representation of this code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Ok` variant.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::MissingInput => write!(f, "ERR_MISSING_INPUT"),
            Self::AllocationFailure => write!(f, "ERR_ALLOCATION_FAILURE"),
        }
    }
}

/// Error type for the guest-side pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyError {
    /// `compute` was called with no live input buffer.
    MissingInput,

    /// An allocation of `requested` bytes could not be satisfied.
    AllocationFailure { requested: usize },
}

impl TallyError {
    /// The ABI status code reported for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingInput => ErrorCode::MissingInput,
            Self::AllocationFailure { .. } => ErrorCode::AllocationFailure,
        }
    }
}

impl fmt::Display for TallyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "no input buffer has been allocated"),
            Self::AllocationFailure { requested } => {
                write!(f, "allocation of {} bytes failed", requested)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TallyError {}

/// Convenience result type for the guest-side pipeline.
pub type TallyResult<T> = core::result::Result<T, TallyError>;
