//! The computation applied to the parsed numbers.
//!
//! The guest ships [`Sum`]. Anything implementing [`Reducer`] can replace it
//! without touching buffer management or marshalling.

use crate::numbers::Numbers;

/// Folds a number sequence into the single value reported in the envelope.
pub trait Reducer {
    fn reduce(&self, numbers: Numbers<'_>) -> i32;
}

/// Wrapping `i32` sum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sum;

impl Reducer for Sum {
    fn reduce(&self, numbers: Numbers<'_>) -> i32 {
        numbers.fold(0i32, i32::wrapping_add)
    }
}
